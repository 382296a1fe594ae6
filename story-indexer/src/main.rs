use clap::{Arg, ArgAction, Command};
use std::collections::HashSet;
use std::fs;
use walkdir::WalkDir;

use story_filter::builder::FilterBuilder;
use utils_common::StoryMetadata;

// 主函数
fn main() {
    // 设置命令行参数
    let matches = Command::new("故事索引生成器")
        .version(env!("CARGO_PKG_VERSION"))
        .author("PublicPress")
        .about("扫描故事JSON文件并生成筛选索引")
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("SOURCE_DIR")
                .help("故事源目录路径")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("OUTPUT_DIR")
                .help("索引输出目录路径")
                .required(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("显示详细信息")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    // 获取参数值
    let source_dir = matches.get_one::<String>("source").unwrap();
    let output_dir = matches.get_one::<String>("output").unwrap();
    let verbose = matches.get_flag("verbose");

    // 检查目录
    let source_path = std::path::Path::new(source_dir);
    if !source_path.exists() || !source_path.is_dir() {
        eprintln!("错误: 源目录不存在或不是有效目录 '{}'", source_dir);
        std::process::exit(1);
    }

    // 创建输出目录
    let output_path = std::path::Path::new(output_dir);
    if !output_path.exists() {
        if let Err(e) = std::fs::create_dir_all(output_path) {
            eprintln!("错误: 无法创建输出目录 '{}': {}", output_dir, e);
            std::process::exit(1);
        }
    }

    println!("开始生成索引...");
    println!("源目录: {}", source_dir);
    println!("输出目录: {}", output_dir);

    // 生成索引
    match generate_index(source_dir, output_dir, verbose) {
        Ok(_) => println!("索引生成成功！"),
        Err(e) => {
            eprintln!("错误: 索引生成失败: {}", e);
            std::process::exit(1);
        }
    }
}

// 生成索引的主函数
fn generate_index(source_dir: &str, output_dir: &str, verbose: bool) -> Result<(), String> {
    // 记录开始时间
    let start_time = std::time::Instant::now();

    // 扫描故事文件
    println!("扫描故事文件...");
    let (stories, skipped_count) = scan_story_files(source_dir, verbose)?;

    let story_count = stories.len();
    println!(
        "扫描完成。找到 {} 篇有效故事，跳过 {} 个文件。",
        story_count, skipped_count
    );

    if story_count == 0 {
        return Err("没有找到有效故事".to_string());
    }

    // 创建筛选索引构建器
    let mut filter_builder = FilterBuilder::new();
    for story in stories {
        filter_builder.add_story(story);
    }

    // 构建输出路径
    let filter_index_path = format!("{}/filter_index.bin", output_dir);

    // 保存索引
    println!("正在生成和保存索引...");
    filter_builder.save_filter_index(&filter_index_path)?;

    // 计算耗时
    let elapsed = start_time.elapsed();
    println!("索引生成完成！耗时: {:.2}秒", elapsed.as_secs_f32());

    Ok(())
}

// 扫描JSON文件并提取故事数据
fn scan_story_files(dir_path: &str, verbose: bool) -> Result<(Vec<StoryMetadata>, usize), String> {
    let mut stories = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut skipped_files = 0;
    let mut total_files = 0;

    // 递归遍历目录
    for entry in WalkDir::new(dir_path) {
        let entry = entry.map_err(|e| format!("遍历目录时出错: {}", e))?;

        // 只处理JSON文件
        if !entry.file_type().is_file()
            || !entry.path().extension().map_or(false, |ext| ext == "json")
        {
            continue;
        }

        total_files += 1;

        let content = match fs::read_to_string(entry.path()) {
            Ok(content) => content,
            Err(e) => {
                if verbose {
                    eprintln!("无法读取文件 {}: {}", entry.path().display(), e);
                }
                skipped_files += 1;
                continue;
            }
        };

        match parse_story_file(&content) {
            Ok(parsed) => {
                for story in parsed {
                    // 跳过重复ID，保证索引中没有重复故事
                    if !seen_ids.insert(story.id.clone()) {
                        if verbose {
                            eprintln!("跳过重复的故事ID: {}", story.id);
                        }
                        continue;
                    }
                    stories.push(story);
                }
            }
            Err(err) => {
                skipped_files += 1;
                if verbose {
                    eprintln!("解析文件时出错 {}: {}", entry.path().display(), err);
                }
            }
        }
    }

    // 打印统计信息
    if verbose {
        println!("总JSON文件数: {}, 有效故事数: {}", total_files, stories.len());
    }

    Ok((stories, skipped_files))
}

// 解析单个故事文件，接受单个故事对象或故事数组
fn parse_story_file(content: &str) -> Result<Vec<StoryMetadata>, String> {
    if let Ok(stories) = serde_json::from_str::<Vec<StoryMetadata>>(content) {
        return Ok(stories);
    }

    serde_json::from_str::<StoryMetadata>(content)
        .map(|story| vec![story])
        .map_err(|e| format!("无法解析故事JSON: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE_STORY: &str = r#"{
        "id": "1",
        "title": "The Rising Waters",
        "excerpt": "Coastal communities and rising sea levels.",
        "author": { "name": "Eliza Chen", "verified": true },
        "publishedAt": "May 3, 2025",
        "category": "Climate",
        "region": "Global",
        "commentsCount": 24,
        "likesCount": 156,
        "viewsCount": 3240
    }"#;

    #[test]
    fn parses_a_single_story_object() {
        let stories = parse_story_file(SINGLE_STORY).unwrap();
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].id, "1");
        assert_eq!(stories[0].category, "Climate");
    }

    #[test]
    fn parses_a_story_array() {
        let content = format!("[{}, {}]", SINGLE_STORY, SINGLE_STORY.replace("\"1\"", "\"2\""));
        let stories = parse_story_file(&content).unwrap();
        assert_eq!(stories.len(), 2);
        assert_eq!(stories[1].id, "2");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(parse_story_file("not a story").is_err());
        assert!(parse_story_file("{\"id\": \"1\"}").is_err());
    }
}
