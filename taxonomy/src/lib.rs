use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use wasm_bindgen::prelude::*;

// 初始化错误处理
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

// 组合分类的分隔符，与筛选模块保持一致
const CATEGORY_SEPARATOR: &str = ": ";

// 分类节点 - 顶级分类和可选的子分类列表
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CategoryNode {
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
}

// 地区节点 - 大区和所覆盖的国家列表
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegionNode {
    pub name: String,
    #[serde(default)]
    pub countries: Vec<String>,
}

// 分类和地区数据 - 作为数据而不是枚举，允许替换扩展
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaxonomyData {
    pub categories: Vec<CategoryNode>,
    pub regions: Vec<RegionNode>,
}

// 生成选中分类时传给筛选器的值
//
// 选中子分类时返回"主分类: 子分类"组合形式，与界面上展示的文本一致。
#[wasm_bindgen]
pub fn selection_value(main: &str, subcategory: Option<String>) -> String {
    match subcategory {
        Some(sub) if !sub.is_empty() => format!("{}{}{}", main, CATEGORY_SEPARATOR, sub),
        _ => main.to_string(),
    }
}

// 分类/地区层级查询
pub struct Taxonomy {
    data: TaxonomyData,
    country_to_region: HashMap<String, String>,
}

impl Taxonomy {
    // 使用内置的默认数据
    pub fn with_defaults() -> Taxonomy {
        Self::from_data(default_taxonomy())
    }

    // 从JSON数据构建
    pub fn from_json(json: &str) -> Result<Taxonomy, String> {
        let data: TaxonomyData =
            serde_json::from_str(json).map_err(|e| format!("解析分类数据失败: {}", e))?;
        Ok(Self::from_data(data))
    }

    fn from_data(data: TaxonomyData) -> Taxonomy {
        // 建立国家到大区的反向索引
        let mut country_to_region = HashMap::new();
        for region in &data.regions {
            for country in &region.countries {
                country_to_region.insert(country.clone(), region.name.clone());
            }
        }

        Taxonomy {
            data,
            country_to_region,
        }
    }

    // 所有顶级分类
    pub fn top_categories(&self) -> Vec<String> {
        self.data.categories.iter().map(|c| c.name.clone()).collect()
    }

    // 指定主分类下的子分类，未知分类返回空列表
    pub fn subcategories(&self, main: &str) -> Vec<String> {
        self.data
            .categories
            .iter()
            .find(|c| c.name == main)
            .map(|c| c.subcategories.clone())
            .unwrap_or_default()
    }

    // 所有大区
    pub fn regions(&self) -> Vec<String> {
        self.data.regions.iter().map(|r| r.name.clone()).collect()
    }

    // 指定大区覆盖的国家，未知大区返回空列表
    pub fn countries(&self, region: &str) -> Vec<String> {
        self.data
            .regions
            .iter()
            .find(|r| r.name == region)
            .map(|r| r.countries.clone())
            .unwrap_or_default()
    }

    // 查找国家所属的大区
    pub fn region_of_country(&self, country: &str) -> Option<String> {
        self.country_to_region.get(country).cloned()
    }

    pub fn contains_category(&self, name: &str) -> bool {
        self.data.categories.iter().any(|c| c.name == name)
    }

    pub fn contains_region(&self, name: &str) -> bool {
        self.data.regions.iter().any(|r| r.name == name)
    }
}

// 内置的默认分类和地区数据
fn default_taxonomy() -> TaxonomyData {
    fn category(name: &str, subcategories: &[&str]) -> CategoryNode {
        CategoryNode {
            name: name.to_string(),
            subcategories: subcategories.iter().map(|s| s.to_string()).collect(),
        }
    }
    fn region(name: &str, countries: &[&str]) -> RegionNode {
        RegionNode {
            name: name.to_string(),
            countries: countries.iter().map(|s| s.to_string()).collect(),
        }
    }

    TaxonomyData {
        categories: vec![
            category("Politics", &["Elections", "Policy", "Diplomacy"]),
            category("Climate", &["Sea Levels", "Extreme Weather", "Adaptation"]),
            category("Technology", &["AI", "Cybersecurity", "Media"]),
            category("Human Rights", &[]),
            category("Health", &["Public Health", "Mental Health"]),
            category("Economy", &["Labor", "Trade"]),
            category("Culture", &["Arts", "Heritage"]),
            category("Science", &["Research", "Space"]),
            category("Environment", &["Conservation", "Agriculture"]),
            category("Education", &[]),
        ],
        regions: vec![
            region("Global", &[]),
            region("North America", &["United States", "Canada", "Mexico"]),
            region("Europe", &["United Kingdom", "France", "Germany", "Ukraine"]),
            region("Asia", &["China", "India", "Japan", "Indonesia"]),
            region("Africa", &["Nigeria", "Kenya", "South Africa", "Ethiopia"]),
            region("South America", &["Brazil", "Argentina", "Colombia"]),
            region("Middle East", &["Yemen", "Israel", "Jordan", "Lebanon"]),
            region("Oceania", &["Australia", "New Zealand", "Fiji"]),
        ],
    }
}

// 分类层级JS接口 - 提供给JavaScript使用的查询API
#[wasm_bindgen]
pub struct TaxonomyJS {
    inner: Taxonomy,
}

#[wasm_bindgen]
impl TaxonomyJS {
    // 使用内置数据创建
    #[wasm_bindgen(constructor)]
    pub fn new() -> TaxonomyJS {
        console_error_panic_hook::set_once();
        TaxonomyJS {
            inner: Taxonomy::with_defaults(),
        }
    }

    // 加载替换的分类数据
    #[wasm_bindgen]
    pub fn load(&mut self, json: &str) -> Result<(), JsValue> {
        self.inner = Taxonomy::from_json(json).map_err(|e| JsValue::from_str(&e))?;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn top_categories(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.top_categories()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen]
    pub fn subcategories(&self, main: &str) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.subcategories(main)).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen]
    pub fn regions(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.regions()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen]
    pub fn countries(&self, region: &str) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.countries(region)).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen]
    pub fn region_of_country(&self, country: &str) -> Option<String> {
        self.inner.region_of_country(country)
    }

    #[wasm_bindgen]
    pub fn contains_category(&self, name: &str) -> bool {
        self.inner.contains_category(name)
    }

    #[wasm_bindgen]
    pub fn contains_region(&self, name: &str) -> bool {
        self.inner.contains_region(name)
    }
}
