use crate::models::FilterIndex;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use utils_common::compression::to_compressed;
use utils_common::models::StoryMetadata;
use utils_common::CONTAINER_VERSION;

/// 筛选索引构建器
pub struct FilterBuilder {
    stories: Vec<StoryMetadata>,
}

impl FilterBuilder {
    /// 创建新的筛选索引构建器
    pub fn new() -> Self {
        Self {
            stories: Vec::new(),
        }
    }

    /// 添加故事到索引构建器
    pub fn add_story(&mut self, story: StoryMetadata) {
        self.stories.push(story);
    }

    /// 已添加的故事数量
    pub fn story_count(&self) -> usize {
        self.stories.len()
    }

    /// 构建筛选索引
    pub fn build_filter_index(&self) -> Result<FilterIndex, String> {
        if self.stories.is_empty() {
            println!("错误: 无法构建索引，没有故事数据");
            return Err("无法构建索引: 没有故事数据".to_string());
        }

        println!("开始构建筛选索引，故事数量: {}", self.stories.len());

        // 创建索引数据结构
        let mut category_index: HashMap<String, Vec<usize>> = HashMap::new();
        let mut region_index: HashMap<String, Vec<usize>> = HashMap::new();

        // 填充索引
        for (i, story) in self.stories.iter().enumerate() {
            category_index
                .entry(story.category.clone())
                .or_default()
                .push(i);
            region_index
                .entry(story.region.clone())
                .or_default()
                .push(i);
        }

        println!(
            "索引构建完成，分类数量: {}, 地区数量: {}",
            category_index.len(),
            region_index.len()
        );

        Ok(FilterIndex {
            stories: self.stories.clone(),
            category_index,
            region_index,
        })
    }

    /// 保存筛选索引到文件
    pub fn save_filter_index(&self, path: &str) -> Result<(), String> {
        println!("开始保存筛选索引到文件: {}", path);

        let filter_index = self.build_filter_index()?;

        // 压缩索引数据
        let compressed_data = match to_compressed(&filter_index, CONTAINER_VERSION) {
            Ok(data) => {
                println!("数据压缩成功，压缩后大小: {} 字节", data.len());
                data
            }
            Err(e) => {
                println!("数据压缩失败: {}", e);
                return Err(format!("压缩筛选索引失败: {}", e));
            }
        };

        // 写入文件
        let mut filter_file = match File::create(path) {
            Ok(file) => file,
            Err(e) => {
                println!("创建索引文件失败: {}", e);
                return Err(format!("无法创建筛选索引文件: {}", e));
            }
        };

        match filter_file.write_all(&compressed_data) {
            Ok(_) => {
                println!(
                    "筛选索引已成功写入文件: {}，大小: {} 字节",
                    path,
                    compressed_data.len()
                );
            }
            Err(e) => {
                println!("写入筛选索引文件失败: {}", e);
                return Err(format!("无法写入筛选索引文件: {}", e));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use utils_common::compression::from_compressed;
    use utils_common::models::Author;

    fn story(id: &str, category: &str, region: &str) -> StoryMetadata {
        StoryMetadata {
            id: id.to_string(),
            title: format!("Story {}", id),
            excerpt: String::new(),
            cover_image: String::new(),
            author: Author {
                name: "Test Author".to_string(),
                avatar: None,
                verified: false,
            },
            published_at: "May 3, 2025".to_string(),
            category: category.to_string(),
            region: region.to_string(),
            read_time: 0,
            comments_count: 0,
            likes_count: 0,
            views_count: 0,
            featured: false,
        }
    }

    #[test]
    fn build_fails_without_stories() {
        assert!(FilterBuilder::new().build_filter_index().is_err());
    }

    #[test]
    fn build_indexes_categories_and_regions() {
        let mut builder = FilterBuilder::new();
        builder.add_story(story("1", "Climate", "Global"));
        builder.add_story(story("2", "Politics", "North America"));
        builder.add_story(story("3", "Climate", "Middle East"));

        let index = builder.build_filter_index().unwrap();
        assert_eq!(index.stories.len(), 3);
        assert_eq!(index.category_index["Climate"], vec![0, 2]);
        assert_eq!(index.category_index["Politics"], vec![1]);
        assert_eq!(index.region_index["Middle East"], vec![2]);
    }

    #[test]
    fn index_survives_compressed_roundtrip() {
        let mut builder = FilterBuilder::new();
        builder.add_story(story("1", "Climate", "Global"));

        let index = builder.build_filter_index().unwrap();
        let bytes = to_compressed(&index, CONTAINER_VERSION).unwrap();
        let restored: FilterIndex = from_compressed(&bytes).unwrap();
        assert_eq!(restored.stories, index.stories);
        assert_eq!(restored.category_index, index.category_index);
    }
}
