use chrono::{DateTime, NaiveDate};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::Mutex;
use utils_common::compression as utils;
use utils_common::models::StoryMetadata;
use wasm_bindgen::prelude::*;
use web_sys::console;

// 导出模块
pub mod builder;
pub mod models;
pub mod query;

use models::{FilterIndex, FilterState, Navigation, SortBy, ALL};

// 全局索引存储
static INDEX: OnceCell<Mutex<Option<FilterIndex>>> = OnceCell::new();
// 全局筛选状态
static STATE: OnceCell<Mutex<FilterState>> = OnceCell::new();

/// 初始化函数 - 设置错误处理
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// 版本信息
#[wasm_bindgen]
pub fn version() -> String {
    "1.0.0".to_string()
}

/// 筛选结果 - 返回给客户端的筛选结果
#[derive(Serialize, Debug)]
pub struct FilterResult {
    /// 筛选排序后的故事列表
    pub stories: Vec<StoryMetadata>,
    /// 筛选结果总数
    pub total: usize,
}

/// 故事过滤器 - 处理筛选、排序和URL同步逻辑
pub struct StoryFilter;

impl StoryFilter {
    /// 加载索引数据
    pub fn load_index(data: &[u8]) -> Result<(), String> {
        let index: FilterIndex = match utils::from_compressed(data) {
            Ok(index) => index,
            Err(e) => {
                console::log_1(&JsValue::from_str(&format!("索引解析失败: {}", e)));
                return Err(format!("解析索引失败: {}", e));
            }
        };

        // 存储到全局变量
        let mutex = INDEX.get_or_init(|| Mutex::new(None));
        let mut guard = mutex.lock().map_err(|_| "获取索引锁失败".to_string())?;
        *guard = Some(index);
        Ok(())
    }

    // 在全局状态上执行一次读写操作
    fn with_state<R>(f: impl FnOnce(&mut FilterState) -> R) -> Result<R, String> {
        let mutex = STATE.get_or_init(|| Mutex::new(FilterState::default()));
        let mut guard = mutex.lock().map_err(|_| "获取状态锁失败".to_string())?;
        Ok(f(&mut guard))
    }

    /// 从URL查询串初始化筛选状态
    pub fn init_from_query(query_string: &str) -> Result<FilterState, String> {
        let state = query::parse_query(query_string);
        Self::with_state(|s| *s = state.clone())?;
        Ok(state)
    }

    /// 当前筛选状态
    pub fn current_state() -> Result<FilterState, String> {
        Self::with_state(|s| s.clone())
    }

    /// 更新搜索关键词，返回需要同步到地址栏的导航指令
    pub fn set_search_term(term: &str) -> Result<Navigation, String> {
        Self::with_state(|s| {
            s.search_term = term.to_string();
            Navigation::replace(query::to_query(s))
        })
    }

    /// 更新当前地区
    pub fn set_active_region(region: &str) -> Result<Navigation, String> {
        Self::with_state(|s| {
            s.active_region = region.to_string();
            Navigation::replace(query::to_query(s))
        })
    }

    /// 更新当前分类，接受"主分类: 子分类"组合形式
    pub fn set_active_category(category: &str) -> Result<Navigation, String> {
        Self::with_state(|s| {
            s.active_category = category.to_string();
            Navigation::replace(query::to_query(s))
        })
    }

    /// 更新排序方式，未知值回退为popular
    pub fn set_sort_by(mode: &str) -> Result<Navigation, String> {
        Self::with_state(|s| {
            s.sort_by = SortBy::parse(mode);
            Navigation::replace(query::to_query(s))
        })
    }

    /// 更新排序方向
    pub fn set_is_ascending(ascending: bool) -> Result<Navigation, String> {
        Self::with_state(|s| {
            s.is_ascending = ascending;
            Navigation::replace(query::to_query(s))
        })
    }

    /// 重置所有筛选条件
    ///
    /// 所有字段一次性回到默认值，返回单条push导航指令，查询串整体清空。
    pub fn reset_filters() -> Result<Navigation, String> {
        Self::with_state(|s| {
            *s = FilterState::default();
            Navigation::push(String::new())
        })
    }

    /// 在现有查询串上合并增量参数更新，未提及的参数保持不变
    pub fn update_query_params(
        current_query: &str,
        updates: &[(String, Option<String>)],
    ) -> Navigation {
        Navigation::push(query::merge_query(current_query, updates))
    }

    /// 计算筛选排序后的视图 - 纯函数，不修改输入
    ///
    /// 三个筛选条件按AND组合；排序在筛选之后进行，作用在副本上。
    pub fn compute_filtered_view(
        stories: &[StoryMetadata],
        state: &FilterState,
    ) -> Vec<StoryMetadata> {
        let (main_category, _subcategory) = state.split_category();
        let search = state.search_term.to_lowercase();

        let mut matched: Vec<StoryMetadata> = stories
            .iter()
            .filter(|story| {
                // 搜索：标题、摘要或作者名的大小写不敏感子串匹配
                let matches_search = search.is_empty()
                    || story.title.to_lowercase().contains(&search)
                    || story.excerpt.to_lowercase().contains(&search)
                    || story.author.name.to_lowercase().contains(&search);

                // 地区：精确匹配
                let matches_region =
                    state.active_region == ALL || story.region == state.active_region;

                // 分类：只按主分类匹配。子分类暂不参与匹配，
                // 故事记录目前没有子分类字段
                let matches_category =
                    state.active_category == ALL || story.category == main_category;

                matches_search && matches_region && matches_category
            })
            .cloned()
            .collect();

        Self::sort_stories(&mut matched, state);
        matched
    }

    // 按当前排序条件排序；稳定排序，切换方向时比较器整体取反
    fn sort_stories(stories: &mut [StoryMetadata], state: &FilterState) {
        stories.sort_by(|a, b| {
            let ordering = match state.sort_by {
                SortBy::Popular => a.views_count.cmp(&b.views_count),
                SortBy::Newest => {
                    published_timestamp(&a.published_at).cmp(&published_timestamp(&b.published_at))
                }
                SortBy::MostCommented => a.comments_count.cmp(&b.comments_count),
            };
            if state.is_ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
    }

    /// 对当前加载的索引应用当前状态，返回筛选结果
    pub fn filtered_stories() -> Result<FilterResult, String> {
        let index_mutex = INDEX.get().ok_or("索引未初始化")?;
        let index_guard = index_mutex.lock().map_err(|_| "获取索引锁失败")?;
        let index = index_guard.as_ref().ok_or("索引为空")?;

        let state = Self::current_state()?;
        let stories = Self::compute_filtered_view(&index.stories, &state);
        let total = stories.len();

        Ok(FilterResult { stories, total })
    }

    /// 获取索引中出现过的所有分类（排序后返回，保证确定性）
    pub fn get_all_categories() -> Result<Vec<String>, String> {
        Self::with_index(|index| {
            let mut categories: Vec<String> = index.category_index.keys().cloned().collect();
            categories.sort();
            categories
        })
    }

    /// 获取索引中出现过的所有地区（排序后返回，保证确定性）
    pub fn get_all_regions() -> Result<Vec<String>, String> {
        Self::with_index(|index| {
            let mut regions: Vec<String> = index.region_index.keys().cloned().collect();
            regions.sort();
            regions
        })
    }

    // 在全局索引上执行一次只读操作
    fn with_index<R>(f: impl FnOnce(&FilterIndex) -> R) -> Result<R, String> {
        let index_mutex = INDEX.get().ok_or("索引未初始化")?;
        let index_guard = index_mutex.lock().map_err(|_| "获取索引锁失败")?;
        let index = index_guard.as_ref().ok_or("索引为空")?;
        Ok(f(index))
    }
}

/// 解析发布日期为时间戳
///
/// 支持RFC 3339和"May 3, 2025"两种格式；解析失败按0处理，
/// 排序时固定沉到最旧的一端，不会抛出错误。
pub fn published_timestamp(value: &str) -> i64 {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.timestamp();
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%b %d, %Y") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return dt.and_utc().timestamp();
        }
    }
    0
}

/// 故事过滤器JS接口 - 提供给JavaScript使用的筛选API
#[wasm_bindgen]
pub struct StoryFilterJS;

#[wasm_bindgen]
impl StoryFilterJS {
    /// 初始化过滤器并加载索引
    #[wasm_bindgen]
    pub fn init(index_data: &[u8]) -> Result<(), JsValue> {
        console_error_panic_hook::set_once();

        StoryFilter::load_index(index_data).map_err(|e| {
            console::log_1(&JsValue::from_str(&format!("初始化过滤器失败: {}", e)));
            JsValue::from_str(&e)
        })
    }

    /// 从URL查询串初始化筛选状态，返回解析后的状态
    #[wasm_bindgen]
    pub fn init_from_query(query_string: &str) -> Result<JsValue, JsValue> {
        let state =
            StoryFilter::init_from_query(query_string).map_err(|e| JsValue::from_str(&e))?;
        to_js(&state)
    }

    /// 当前筛选状态
    #[wasm_bindgen]
    pub fn current_state() -> Result<JsValue, JsValue> {
        let state = StoryFilter::current_state().map_err(|e| JsValue::from_str(&e))?;
        to_js(&state)
    }

    /// 更新搜索关键词，返回导航指令
    #[wasm_bindgen]
    pub fn set_search_term(term: &str) -> Result<JsValue, JsValue> {
        let nav = StoryFilter::set_search_term(term).map_err(|e| JsValue::from_str(&e))?;
        to_js(&nav)
    }

    /// 更新当前地区，返回导航指令
    #[wasm_bindgen]
    pub fn set_active_region(region: &str) -> Result<JsValue, JsValue> {
        let nav = StoryFilter::set_active_region(region).map_err(|e| JsValue::from_str(&e))?;
        to_js(&nav)
    }

    /// 更新当前分类，返回导航指令
    #[wasm_bindgen]
    pub fn set_active_category(category: &str) -> Result<JsValue, JsValue> {
        let nav = StoryFilter::set_active_category(category).map_err(|e| JsValue::from_str(&e))?;
        to_js(&nav)
    }

    /// 更新排序方式，返回导航指令
    #[wasm_bindgen]
    pub fn set_sort_by(mode: &str) -> Result<JsValue, JsValue> {
        let nav = StoryFilter::set_sort_by(mode).map_err(|e| JsValue::from_str(&e))?;
        to_js(&nav)
    }

    /// 更新排序方向，返回导航指令
    #[wasm_bindgen]
    pub fn set_is_ascending(ascending: bool) -> Result<JsValue, JsValue> {
        let nav = StoryFilter::set_is_ascending(ascending).map_err(|e| JsValue::from_str(&e))?;
        to_js(&nav)
    }

    /// 重置所有筛选条件，返回导航指令
    #[wasm_bindgen]
    pub fn reset_filters() -> Result<JsValue, JsValue> {
        let nav = StoryFilter::reset_filters().map_err(|e| JsValue::from_str(&e))?;
        to_js(&nav)
    }

    /// 在现有查询串上合并增量参数更新
    ///
    /// updates_json是一个对象，值为null或空串表示删除该参数。
    #[wasm_bindgen]
    pub fn update_query_params(current_query: &str, updates_json: &str) -> Result<JsValue, JsValue> {
        let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(updates_json)
            .map_err(|e| JsValue::from_str(&format!("解析参数失败: {}", e)))?;

        let mut updates = Vec::with_capacity(raw.len());
        for (key, value) in raw {
            let value = match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some(s),
                other => {
                    return Err(JsValue::from_str(&format!(
                        "参数值必须是字符串或null: {} = {}",
                        key, other
                    )))
                }
            };
            updates.push((key, value));
        }

        let nav = StoryFilter::update_query_params(current_query, &updates);
        to_js(&nav)
    }

    /// 筛选故事
    #[wasm_bindgen]
    pub fn filtered_stories() -> Result<JsValue, JsValue> {
        let result = StoryFilter::filtered_stories().map_err(|e| JsValue::from_str(&e))?;
        to_js(&result)
    }

    /// 获取所有分类
    #[wasm_bindgen]
    pub fn get_all_categories() -> Result<JsValue, JsValue> {
        let categories = StoryFilter::get_all_categories().map_err(|e| JsValue::from_str(&e))?;
        to_js(&categories)
    }

    /// 获取所有地区
    #[wasm_bindgen]
    pub fn get_all_regions() -> Result<JsValue, JsValue> {
        let regions = StoryFilter::get_all_regions().map_err(|e| JsValue::from_str(&e))?;
        to_js(&regions)
    }
}

// 序列化为JsValue
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("序列化结果失败: {}", e)))
}
