// src/main.rs
use anyhow::{Context, Result};
use std::fs;
use std::process;
use std::time::Instant;
use tracing::Level;

use aten_ffigen::cli::{CliArgs, OutputFormatter};
use aten_ffigen::config;
use aten_ffigen::diag::{render_diagnostics_colored, DiagSink, SourceMap};
use aten_ffigen::driver;
use aten_ffigen::frontend::loader::load_declarations;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let out = OutputFormatter::new();

    let args = match CliArgs::parse() {
        Ok(a) => a,
        Err(e) => {
            out.error(&e);
            CliArgs::print_usage_error();
            process::exit(1);
        }
    };
    let started = Instant::now();

    // 1) 配置（规格文件同目录的 Codegen.toml，可缺省）
    let cfg = config::load_for_spec(&args.spec_file).context("failed to load Codegen.toml")?;

    // 2) 解码全部声明；有任何 error 都不写文件
    let mut sm = SourceMap::new();
    let mut diags = DiagSink::new();
    let decls = match load_declarations(&args.spec_file, &mut sm, &mut diags) {
        Ok(d) => d,
        Err(e) => {
            render_diagnostics_colored(&diags.into_vec(), &sm);
            out.error(&format!("{e:#}"));
            process::exit(1);
        }
    };
    if !diags.is_empty() {
        render_diagnostics_colored(&diags.into_vec(), &sm);
    }

    // 3) 生成
    let report = match driver::generate(&args.out_dir, &decls, &cfg) {
        Ok(r) => r,
        Err(e) => {
            out.error(&format!("{e:#}"));
            process::exit(1);
        }
    };

    for (path, stanzas) in &report.written {
        let bytes = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        out.written(path, *stanzas, bytes);
    }
    if report.skipped > 0 {
        out.warning(&format!("{} signature(s) skipped on host name collisions", report.skipped));
    }
    out.summary(&report, started.elapsed().as_secs_f64());
    Ok(())
}
