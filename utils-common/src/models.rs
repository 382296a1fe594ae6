use serde::{Deserialize, Serialize};

/// 作者信息 - 故事署名所需的基本信息
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// 作者姓名
    pub name: String,
    /// 头像地址
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub avatar: Option<String>,
    /// 是否为认证记者
    #[serde(default)]
    pub verified: bool,
}

/// 故事元数据 - 列表展示与筛选所需的故事基本信息
///
/// 字段使用camelCase序列化，与前端故事对象保持一致。
/// 记录本身是只读输入，筛选模块只做选择和重排，不修改记录。
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoryMetadata {
    /// 故事唯一标识符
    pub id: String,
    /// 标题
    pub title: String,
    /// 摘要
    pub excerpt: String,
    /// 封面图片地址
    #[serde(default)]
    pub cover_image: String,
    /// 作者信息
    pub author: Author,
    /// 发布日期（保留原始字符串，排序时才解析）
    pub published_at: String,
    /// 分类（开放集合，记录只携带主分类）
    pub category: String,
    /// 地区（开放集合）
    pub region: String,
    /// 预计阅读时长（分钟）
    #[serde(default)]
    pub read_time: u32,
    /// 评论数
    pub comments_count: u32,
    /// 点赞数
    pub likes_count: u32,
    /// 浏览数
    pub views_count: u32,
    /// 是否为推荐故事
    #[serde(default)]
    pub featured: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn story_deserializes_from_camel_case_json() {
        let json = r#"{
            "id": "1",
            "title": "The Rising Waters",
            "excerpt": "An in-depth look at coastal communities.",
            "coverImage": "https://example.com/cover.jpg",
            "author": { "name": "Eliza Chen", "verified": true },
            "publishedAt": "May 3, 2025",
            "category": "Climate",
            "region": "Global",
            "readTime": 8,
            "commentsCount": 24,
            "likesCount": 156,
            "viewsCount": 3240
        }"#;

        let story: StoryMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(story.id, "1");
        assert_eq!(story.author.name, "Eliza Chen");
        assert_eq!(story.author.avatar, None);
        assert_eq!(story.views_count, 3240);
        // 未提供的可选字段取默认值
        assert!(!story.featured);
    }
}
