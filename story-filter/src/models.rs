use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utils_common::models::StoryMetadata;

/// "不限"哨兵值 - 分类和地区筛选共用
pub const ALL: &str = "All";

/// 组合分类的分隔符，形如"主分类: 子分类"
pub const CATEGORY_SEPARATOR: &str = ": ";

/// 排序方式: popular, newest, mostCommented
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// 按浏览数排序（默认）
    #[default]
    #[serde(rename = "popular")]
    Popular,
    /// 按发布日期排序
    #[serde(rename = "newest")]
    Newest,
    /// 按评论数排序
    #[serde(rename = "mostCommented")]
    MostCommented,
}

impl SortBy {
    /// 从字符串解析排序方式，未知值回退为默认的popular
    pub fn parse(value: &str) -> Self {
        match value {
            "newest" => SortBy::Newest,
            "mostCommented" => SortBy::MostCommented,
            _ => SortBy::Popular,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Popular => "popular",
            SortBy::Newest => "newest",
            SortBy::MostCommented => "mostCommented",
        }
    }
}

/// 筛选状态 - 客户端当前的筛选和排序条件
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// 搜索关键词
    pub search_term: String,
    /// 当前地区，"All"表示不限
    pub active_region: String,
    /// 当前分类，"All"表示不限；可以是"主分类: 子分类"组合形式
    pub active_category: String,
    /// 排序方式
    pub sort_by: SortBy,
    /// 是否升序
    pub is_ascending: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            active_region: ALL.to_string(),
            active_category: ALL.to_string(),
            sort_by: SortBy::Popular,
            is_ascending: false,
        }
    }
}

impl FilterState {
    /// 拆分当前分类为主分类和可选的子分类
    pub fn split_category(&self) -> (&str, Option<&str>) {
        split_category(&self.active_category)
    }
}

/// 拆分"主分类: 子分类"组合值
///
/// "All"不做拆分；没有分隔符的值整体作为主分类。
pub fn split_category(value: &str) -> (&str, Option<&str>) {
    if value == ALL {
        return (ALL, None);
    }
    match value.split_once(CATEGORY_SEPARATOR) {
        Some((main, sub)) => (main, Some(sub)),
        None => (value, None),
    }
}

/// 筛选索引 - 存储故事和分类/地区索引
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FilterIndex {
    /// 所有故事的元数据列表
    pub stories: Vec<StoryMetadata>,
    /// 分类到故事ID列表的映射
    pub category_index: HashMap<String, Vec<usize>>,
    /// 地区到故事ID列表的映射
    pub region_index: HashMap<String, Vec<usize>>,
}

/// 历史记录更新方式 - 由JS宿主执行
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NavigationMode {
    /// 原地替换当前历史记录
    Replace,
    /// 压入新的历史记录
    Push,
}

/// 导航指令 - 状态变更后需要同步到地址栏的查询串
///
/// 增量编辑（如边输入边搜索）用replace避免污染浏览历史，
/// 重置和显式的参数更新用push。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Navigation {
    /// 新的查询串，不带前导"?"，可能为空
    pub query: String,
    /// 历史记录更新方式
    pub mode: NavigationMode,
}

impl Navigation {
    pub fn replace(query: String) -> Self {
        Self {
            query,
            mode: NavigationMode::Replace,
        }
    }

    pub fn push(query: String) -> Self {
        Self {
            query,
            mode: NavigationMode::Push,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_uses_all_sentinels() {
        let state = FilterState::default();
        assert_eq!(state.search_term, "");
        assert_eq!(state.active_region, ALL);
        assert_eq!(state.active_category, ALL);
        assert_eq!(state.sort_by, SortBy::Popular);
        assert!(!state.is_ascending);
    }

    #[test]
    fn split_category_handles_composite_form() {
        assert_eq!(split_category("All"), ("All", None));
        assert_eq!(split_category("Climate"), ("Climate", None));
        assert_eq!(
            split_category("Climate: Sea Levels"),
            ("Climate", Some("Sea Levels"))
        );
        // 只按第一个分隔符拆分
        assert_eq!(
            split_category("A: B: C"),
            ("A", Some("B: C"))
        );
    }

    #[test]
    fn sort_by_parse_falls_back_to_popular() {
        assert_eq!(SortBy::parse("newest"), SortBy::Newest);
        assert_eq!(SortBy::parse("mostCommented"), SortBy::MostCommented);
        assert_eq!(SortBy::parse("popular"), SortBy::Popular);
        assert_eq!(SortBy::parse("definitely-not-a-mode"), SortBy::Popular);
    }
}
