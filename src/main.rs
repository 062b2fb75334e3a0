// ==========================================
// 门店物料分配系统 - 命令行入口
// ==========================================
// 子命令: import / distribute / config
// ==========================================

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use material_distributor::api::{
    BatchSource, ConfigOverrides, DistributionApi, DistributionRequest, EXPORT_FILE_STEM,
};
use material_distributor::db::default_db_path;
use material_distributor::exporter::write_blob;
use material_distributor::{logging, ExportFormat, APP_NAME, VERSION};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "material-distributor", version, about = "按门店损耗与毛收入分配当日物料")]
struct Cli {
    /// SQLite 数据库路径（默认: $MATERIAL_DISTRIBUTOR_DB_PATH 或用户数据目录）
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 导入当日物料清单到数据库
    Import(ImportArgs),
    /// 执行一次分配并导出分配表
    Distribute(DistributeArgs),
    /// 读写全局配置
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Args)]
struct ImportArgs {
    /// 物料文件（.xlsx/.xls/.csv；列: CÓDIGO, DESCRIÇÃO, QUANTIDADE）
    file: PathBuf,

    /// 批次日期 YYYY-MM-DD（默认今天）
    #[arg(long)]
    date: Option<NaiveDate>,

    /// 先清空该日已入库物料
    #[arg(long)]
    replace: bool,
}

#[derive(Debug, Args)]
struct DistributeArgs {
    /// 参考数据文件（列: Cod, Cód. Produto, Perda, Receita Bruta）
    #[arg(long)]
    reference: PathBuf,

    /// 物料文件；不指定时读取 --date 当日已入库的物料
    #[arg(long)]
    batch: Option<PathBuf>,

    /// 运行日期 YYYY-MM-DD（默认今天），同时决定读取哪一天的已入库物料
    #[arg(long)]
    date: Option<NaiveDate>,

    /// 输出文件（默认 ./Distribuicao.<format>）
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// 导出格式 xlsx|csv（覆盖配置）
    #[arg(long)]
    format: Option<ExportFormat>,

    /// 单店上限（覆盖配置）
    #[arg(long)]
    cap: Option<u32>,

    /// 兜底门店代码（覆盖配置）
    #[arg(long)]
    fallback_store: Option<String>,

    /// 不写入数据库
    #[arg(long)]
    no_persist: bool,

    /// 在 stdout 输出 JSON 运行报告
    #[arg(long)]
    report_json: bool,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// 读取配置值
    Get { key: String },
    /// 写入配置值
    Set { key: String, value: String },
    /// 列出全部配置
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    let db_path = match &cli.db {
        Some(path) => path.to_string_lossy().to_string(),
        None => default_db_path(),
    };
    tracing::info!(version = VERSION, db_path = %db_path, "{} 启动", APP_NAME);

    let api = DistributionApi::new(&db_path).context("无法打开数据库")?;

    match cli.command {
        Command::Import(args) => run_import(&api, args).await,
        Command::Distribute(args) => run_distribute(&api, args).await,
        Command::Config(cmd) => run_config(&api, cmd),
    }
}

async fn run_import(api: &DistributionApi, args: ImportArgs) -> Result<()> {
    let batch_date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let report = api
        .import_batch(&args.file, batch_date, args.replace)
        .await
        .with_context(|| format!("导入失败: {}", args.file.display()))?;

    println!(
        "{}: 导入 {} 条（替换 {} 条，警告 {} 条）",
        report.batch_date,
        report.imported,
        report.replaced,
        report.summary.violations.len()
    );
    Ok(())
}

async fn run_distribute(api: &DistributionApi, args: DistributeArgs) -> Result<()> {
    let run_date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let batch = match args.batch {
        Some(path) => BatchSource::File(path),
        None => BatchSource::Stored(run_date),
    };

    let mut request = DistributionRequest::new(args.reference, batch);
    request.run_date = run_date;
    request.persist = !args.no_persist;
    request.overrides = ConfigOverrides {
        store_cap: args.cap,
        fallback_store_code: args.fallback_store,
        export_format: args.format,
    };

    let report = api.run_distribution(&request).await?;

    let output = args.output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "{}.{}",
            EXPORT_FILE_STEM,
            report.export.format.extension()
        ))
    });
    write_blob(&output, &report.export.bytes)
        .with_context(|| format!("写出失败: {}", output.display()))?;

    if args.report_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "运行 {}: {} 条分配，{} 条兜底，{} 条拒绝 → {}",
            report.run_id,
            report.outcome.records.len(),
            report.outcome.fallback_count,
            report.outcome.failures.len(),
            output.display()
        );
        for failure in &report.outcome.failures {
            println!("  拒绝 #{}: {}", failure.position, failure.error);
        }
    }

    if let Some(err) = &report.persistence_error {
        eprintln!("警告: 分配结果未写入数据库: {}", err);
    }
    Ok(())
}

fn run_config(api: &DistributionApi, cmd: ConfigCommand) -> Result<()> {
    let manager = api.config_manager();
    match cmd {
        ConfigCommand::Get { key } => match manager.get_global_config_value(&key)? {
            Some(value) => println!("{}", value),
            None => bail!("配置项不存在: {}", key),
        },
        ConfigCommand::Set { key, value } => manager.set_allocation_value(&key, &value)?,
        ConfigCommand::List => {
            for (key, value) in manager.list_global_configs()? {
                println!("{} = {}", key, value);
            }
        }
    }
    Ok(())
}
