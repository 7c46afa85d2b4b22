use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use booknote::convert::{self, render_chapter, sanitize_title};
use booknote::{
    Book, ConversionOverrides, DirectorySink, Epub, ImportConfig, ParseOutcome, Result, SkippedEntry,
};
use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 📚 BookNote - EPUB导入工具
#[derive(Parser)]
#[command(name = "booknote")]
#[command(about = "把EPUB文件转换为Markdown笔记")]
#[command(version)]
struct Args {
    /// EPUB文件路径
    #[arg(help = "要导入的EPUB文件路径")]
    epub_file: PathBuf,

    /// 输出目录
    #[arg(short, long, help = "写入Markdown文件的目录（不指定时只显示转换结果）")]
    output: Option<PathBuf>,

    /// 配置文件
    #[arg(long, help = "YAML格式的导入配置文件")]
    config: Option<PathBuf>,

    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=6), help = "章节标题级别（1-6）")]
    title_level: Option<u8>,

    #[arg(long, help = "章节标题前不加“第N章”")]
    no_number: bool,

    #[arg(long, help = "章节末尾不加分隔线")]
    no_separators: bool,

    #[arg(long, help = "输出原始标记而不是纯文本")]
    preserve_markup: bool,

    #[arg(long, help = "解析时保留章节的原始标记")]
    keep_raw: bool,

    /// 显示指定章节内容
    #[arg(short, long, help = "显示指定章节渲染后的内容（从1开始）")]
    chapter: Option<usize>,

    /// 显示书籍信息
    #[arg(short, long, help = "只显示书籍信息和章节列表")]
    info: bool,

    /// 详细输出模式
    #[arg(short, long, help = "输出调试日志")]
    verbose: bool,
}

impl Args {
    fn overrides(&self) -> ConversionOverrides {
        ConversionOverrides {
            preserve_markup: self.preserve_markup.then_some(true),
            number_chapters: self.no_number.then_some(false),
            title_level: self.title_level,
            add_separators: self.no_separators.then_some(false),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.verbose { "booknote=debug" } else { "booknote=info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("❌ 导入失败 {}: {}", args.epub_file.display(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode> {
    let config = match &args.config {
        Some(path) => ImportConfig::from_file(path)?,
        None => ImportConfig::default(),
    };

    let mut parse_options = config.parse.clone();
    if args.keep_raw {
        parse_options.keep_raw_markup = true;
    }
    let conversion_options = config.conversion.with_overrides(&args.overrides());

    let bytes = fs::read(&args.epub_file)?;
    let epub = Epub::from_bytes(&bytes)?;
    let ParseOutcome { book, skipped } = epub.parse_with_tags(&parse_options, &config.metadata_tags)?;

    report_skipped(&skipped);

    if args.info {
        display_book_info(&book);
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(number) = args.chapter {
        let index = number as isize - 1;
        let chapter = book.chapter(index)?;
        println!("{}", render_chapter(chapter, &conversion_options));
        return Ok(ExitCode::SUCCESS);
    }

    let files = convert::convert_book(&book, &conversion_options);
    let issues = convert::check(&files);
    if !issues.is_empty() {
        for issue in &issues {
            warn!(%issue, "转换结果不完整");
        }
        eprintln!("❌ 转换结果未通过校验，未写入任何文件");
        return Ok(ExitCode::FAILURE);
    }

    match &args.output {
        Some(output) => {
            let mut base = sanitize_title(&book.metadata().title);
            if base.is_empty() {
                base = "book".to_string();
            }

            let mut sink = DirectorySink::new(output);
            let written = convert::persist(&files, &mut sink, &base)?;
            info!(files = written, "笔记写入完成");
            println!("🎉 已写入 {} 个文件到 {}", written, output.join(&base).display());
        }
        None => {
            println!("📄 转换结果（{} 个文件）:", files.len());
            for (name, content) in &files {
                println!("  {} ({} 字节)", name, content.len());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn report_skipped(skipped: &[SkippedEntry]) {
    if skipped.is_empty() {
        return;
    }
    println!("⚠️  跳过了 {} 个章节:", skipped.len());
    for entry in skipped {
        println!("  {}: {}", entry.id, entry.reason);
    }
}

fn display_book_info(book: &Book) {
    let metadata = book.metadata();
    let summary = book.summary(Utc::now());

    println!("\n📚 书籍信息:");
    println!("  标题: {}", summary.title);
    println!("  作者: {}", summary.author);
    if let Some(description) = &summary.description {
        println!("  简介: {}", description);
    }
    if let Some(language) = &metadata.language {
        println!("  语言: {}", language);
    }
    if let Some(publisher) = &metadata.publisher {
        println!("  出版社: {}", publisher);
    }
    if let Some(identifier) = &metadata.identifier {
        println!("  标识符: {}", identifier);
    }
    if let Some(published) = &metadata.published {
        println!("  出版日期: {}", published);
    }
    if !metadata.subjects.is_empty() {
        println!("  主题: {}", metadata.subjects.join("、"));
    }
    if let Some(cover) = &metadata.cover_image_href {
        println!("  封面: {}", cover);
    }

    let stats = book.parse_stats();
    println!("\n  📈 统计:");
    println!("    章节数: {}", summary.chapter_count);
    println!("    总字数: {}", convert::toc::group_thousands(summary.total_word_count));
    println!("    解析耗时: {} ms", stats.parse_time_ms);
    println!("    文件大小: {} 字节 → 文本 {} 字节", stats.original_size_bytes, stats.parsed_size_bytes);

    println!("\n  📖 章节列表:");
    for chapter in book.chapters() {
        println!("    {}. {} ({} 字)", chapter.index + 1, chapter.title, chapter.word_count);
    }
}
