//! Health check for self-hosted CI runners: toolchain, libraries, tools, disk, network.
//! Exits 0 only when every check passed.

use repo_dashboard::config::health::HealthConfig;
use repo_dashboard::health::host::{system_info, SystemHost};
use repo_dashboard::health::{run_checks, HealthReport};

fn print_report(report: &HealthReport) {
    let mut current = None;
    for r in &report.results {
        if current != Some(r.section) {
            println!("\n{}", r.section.heading());
            current = Some(r.section);
        }
        println!("   {}", r.line());
    }

    println!("\n📊 Health Check Summary:");
    println!("   Passed: {}/{}", report.passed(), report.total());
    if report.all_passed() {
        println!("🎉 All checks passed! Runner environment is ready.");
    } else {
        println!("⚠️  Some checks failed. Please address the issues above.");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _ = dotenvy::dotenv();
    repo_dashboard::init_tracing("warn");

    println!("🔍 Self-Hosted Runner Health Check");
    println!("{}", "=".repeat(40));

    let info = system_info();
    println!("\n📋 System Information:");
    println!("   OS: {}", info.os);
    println!("   Kernel: {}", info.kernel);
    println!("   Architecture: {}", info.arch);
    println!("   Executable: {}", info.executable);

    let cfg = match HealthConfig::load_default() {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = ?e, "health config unreadable, using defaults");
            HealthConfig::default()
        }
    };

    let workdir = std::env::current_dir().unwrap_or_else(|_| ".".into());
    let report = run_checks(&SystemHost, &cfg, &workdir).await;
    print_report(&report);

    std::process::exit(report.exit_code());
}
