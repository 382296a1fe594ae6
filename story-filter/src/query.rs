use crate::models::{FilterState, ALL};
use url::form_urlencoded;

/// 从URL查询串解析筛选状态
///
/// 只识别search、region、category三个参数，缺失或为空的参数取默认值，
/// 未知参数直接忽略。排序选项不参与URL同步。
pub fn parse_query(query: &str) -> FilterState {
    let mut state = FilterState::default();

    for (key, value) in form_urlencoded::parse(strip_leading(query).as_bytes()) {
        // 空值等价于参数缺失
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            "search" => state.search_term = value.into_owned(),
            "region" => state.active_region = value.into_owned(),
            "category" => state.active_category = value.into_owned(),
            _ => {}
        }
    }

    state
}

/// 将筛选状态序列化为URL查询串
///
/// 只输出非默认值的参数，固定按search、region、category的顺序，
/// 全默认状态序列化为空串。
pub fn to_query(state: &FilterState) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());

    if !state.search_term.is_empty() {
        serializer.append_pair("search", &state.search_term);
    }
    if state.active_region != ALL {
        serializer.append_pair("region", &state.active_region);
    }
    if state.active_category != ALL {
        serializer.append_pair("category", &state.active_category);
    }

    serializer.finish()
}

/// 在现有查询串上合并增量参数更新
///
/// None或空串表示删除该参数，其余值原位覆盖（保留首次出现的位置，
/// 清理后续的同名重复）；未提及的参数按原有顺序原样保留。
pub fn merge_query(current: &str, updates: &[(String, Option<String>)]) -> String {
    let mut pairs: Vec<(String, String)> = form_urlencoded::parse(strip_leading(current).as_bytes())
        .into_owned()
        .collect();

    for (key, value) in updates {
        match value {
            Some(v) if !v.is_empty() => {
                let mut replaced = false;
                pairs.retain_mut(|pair| {
                    if pair.0 == *key {
                        if replaced {
                            return false;
                        }
                        pair.1 = v.clone();
                        replaced = true;
                    }
                    true
                });
                if !replaced {
                    pairs.push((key.clone(), v.clone()));
                }
            }
            _ => pairs.retain(|(k, _)| k != key),
        }
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer.extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    serializer.finish()
}

/// 去掉查询串的前导"?"
fn strip_leading(query: &str) -> &str {
    query.strip_prefix('?').unwrap_or(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SortBy;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_query_parses_to_defaults() {
        assert_eq!(parse_query(""), FilterState::default());
        assert_eq!(parse_query("?"), FilterState::default());
    }

    #[test]
    fn parse_reads_known_params_and_ignores_unknown() {
        let state = parse_query("?search=yemen&region=Middle+East&category=Climate&utm_source=x");
        assert_eq!(state.search_term, "yemen");
        assert_eq!(state.active_region, "Middle East");
        assert_eq!(state.active_category, "Climate");
        // 排序选项不参与URL同步，保持默认
        assert_eq!(state.sort_by, SortBy::Popular);
        assert!(!state.is_ascending);
    }

    #[test]
    fn empty_param_value_is_treated_as_absent() {
        let state = parse_query("search=&region=&category=Climate");
        assert_eq!(state.search_term, "");
        assert_eq!(state.active_region, "All");
        assert_eq!(state.active_category, "Climate");
    }

    #[test]
    fn to_query_omits_default_values() {
        assert_eq!(to_query(&FilterState::default()), "");

        let state = FilterState {
            active_region: "Middle East".to_string(),
            ..FilterState::default()
        };
        assert_eq!(to_query(&state), "region=Middle+East");
    }

    #[test]
    fn to_query_encodes_composite_category() {
        let state = FilterState {
            search_term: "rising waters".to_string(),
            active_category: "Climate: Sea Levels".to_string(),
            ..FilterState::default()
        };
        assert_eq!(
            to_query(&state),
            "search=rising+waters&category=Climate%3A+Sea+Levels"
        );
    }

    #[test]
    fn parse_roundtrips_reachable_states() {
        let states = [
            FilterState::default(),
            FilterState {
                search_term: "climate".to_string(),
                ..FilterState::default()
            },
            FilterState {
                search_term: "art & culture".to_string(),
                active_region: "South America".to_string(),
                active_category: "Culture: Arts".to_string(),
                ..FilterState::default()
            },
        ];

        for state in states {
            assert_eq!(parse_query(&to_query(&state)), state);
        }
    }

    #[test]
    fn merge_preserves_unmentioned_params() {
        let merged = merge_query(
            "?search=yemen&page=2",
            &[("category".to_string(), Some("Humanitarian".to_string()))],
        );
        assert_eq!(merged, "search=yemen&page=2&category=Humanitarian");
    }

    #[test]
    fn merge_overwrites_in_place() {
        let merged = merge_query(
            "region=Asia&search=flood",
            &[("region".to_string(), Some("Africa".to_string()))],
        );
        assert_eq!(merged, "region=Africa&search=flood");
    }

    #[test]
    fn merge_deletes_on_null_or_empty() {
        let merged = merge_query(
            "search=flood&region=Asia&category=Climate",
            &[
                ("search".to_string(), None),
                ("region".to_string(), Some(String::new())),
            ],
        );
        assert_eq!(merged, "category=Climate");
    }

    #[test]
    fn merge_collapses_duplicate_keys() {
        let merged = merge_query(
            "region=Asia&search=flood&region=Europe",
            &[("region".to_string(), Some("Africa".to_string()))],
        );
        assert_eq!(merged, "region=Africa&search=flood");
    }
}
