//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 motion-runtime 覆盖率
//! - `cov-workspace`: 运行 workspace 覆盖率
//! - `config-check`: 检查引擎配置文件（语法、未知字段、取值范围）

use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use motion_runtime::EngineConfig;
use serde_json::Value;

/// 未指定路径时检查的配置文件
const DEFAULT_CONFIG_PATH: &str = "motion.json";

fn run(step: &str, cmd: &mut Command) -> anyhow::Result<()> {
    eprintln!("\n==> {step}");
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{step} failed with {status}");
    }
    Ok(())
}

fn ensure_cargo_llvm_cov_available() -> anyhow::Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["llvm-cov", "--version"]);
    match cmd.status() {
        Ok(s) if s.success() => Ok(()),
        _ => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            let mut fmt = Command::new("cargo");
            fmt.args(["fmt", "--all", "--", "--check"]);
            run("cargo fmt --all -- --check", &mut fmt)?;

            let mut clippy = Command::new("cargo");
            clippy.args(["clippy", "--workspace", "--all-targets"]);
            run("cargo clippy --workspace --all-targets", &mut clippy)?;

            let mut test = Command::new("cargo");
            test.args(["test", "--workspace"]);
            run("cargo test --workspace", &mut test)?;
        }
        "cov-runtime" => {
            ensure_cargo_llvm_cov_available()?;

            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "-p", "motion-runtime", "--html"]);
            run("cargo llvm-cov -p motion-runtime --html", &mut cov)?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "cov-workspace" => {
            ensure_cargo_llvm_cov_available()?;

            // 口径上排除 xtask，以免稀释信号
            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "--workspace", "--exclude", "xtask", "--html"]);
            run(
                "cargo llvm-cov --workspace --exclude xtask --html",
                &mut cov,
            )?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "config-check" => {
            let path = args
                .next()
                .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
            config_check(&path)?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  cov-runtime     运行 motion-runtime 覆盖率报告
  cov-workspace   运行 workspace 覆盖率报告
  config-check    检查引擎配置文件

CONFIG-CHECK:
  cargo xtask config-check [path]

  不带参数：检查 workspace 根目录下的 motion.json
  带路径参数：检查指定文件

  检查内容：
    - JSON 语法错误
    - 未知字段（拼写错误的键会被静默忽略，这里单独列出）
    - 断点、滚动、光标平滑系数、触发阈值、选择器、日志级别

ALIASES (in .cargo/config.toml):
  cargo check-all     -> cargo xtask check-all
  cargo cov-runtime   -> cargo xtask cov-runtime
  cargo cov-workspace -> cargo xtask cov-workspace
  cargo config-check  -> cargo xtask config-check
"#
    );
}

//=============================================================================
// config-check 命令实现
//=============================================================================

/// 检查单个配置文件
///
/// 与 `EngineConfig::load` 不同，这里不回退到默认值：任何问题都报告为失败。
fn config_check(path: &Path) -> anyhow::Result<()> {
    if !path.is_file() {
        anyhow::bail!(
            "配置文件不存在: {}\n请在 workspace 根目录运行，或指定配置路径",
            path.display()
        );
    }
    eprintln!("==> 检查配置文件 {}\n", path.display());

    let content = std::fs::read_to_string(path)?;
    let raw: Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => anyhow::bail!("[ERROR] JSON 解析失败: {e}"),
    };

    let reference = serde_json::to_value(EngineConfig::default())?;
    let mut unknown = Vec::new();
    collect_unknown_keys(&raw, &reference, "", &mut unknown);
    for key in &unknown {
        eprintln!("[WARN] 未知字段: {key}");
    }

    let config: EngineConfig = match serde_json::from_value(raw) {
        Ok(c) => c,
        Err(e) => anyhow::bail!("[ERROR] 字段类型错误: {e}"),
    };

    eprintln!("─────────────────────────────────────────────────────");
    match config.validate() {
        Ok(()) if unknown.is_empty() => {
            eprintln!("✅ 检查通过，无错误");
            Ok(())
        }
        Ok(()) => {
            eprintln!("⚠️  0 个错误, {} 个警告", unknown.len());
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {e}");
            anyhow::bail!("配置检查发现错误");
        }
    }
}

/// 递归比较对象键，收集默认配置中不存在的字段路径
fn collect_unknown_keys(value: &Value, reference: &Value, prefix: &str, out: &mut Vec<String>) {
    let (Value::Object(map), Value::Object(known)) = (value, reference) else {
        return;
    };
    for (key, child) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match known.get(key) {
            Some(expected) => collect_unknown_keys(child, expected, &path, out),
            None => out.push(path),
        }
    }
}
