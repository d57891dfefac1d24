//! Interactive HRMS dashboard client
//!
//! Restores a saved session or logs in, walks the gate through the pages the
//! user can see, and prints the dashboard summary.
//!
//! Configuration comes from `HRMS_*` environment variables (a `.env` file is
//! read if present).
//!
//! Run: cargo run --example dashboard

use std::io::{self, Write};

use anyhow::Context;
use hrms_client::logger::init_logger;
use hrms_client::{ClientConfig, GateDecision, HrmsClient, SessionState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = ClientConfig::from_env();
    init_logger(&config.log_level, false)?;

    println!("\n🦀 HRMS Dashboard Client");
    println!("========================\n");
    println!("Backend: {}", config.base_url);

    let client = HrmsClient::from_config(config)?;
    let watcher = client.watch_session();

    if client.initialize() == SessionState::Authenticated {
        let user = client.session().user().context("restored session without user")?;
        println!("✅ Restored session for {}", user.username);
    } else {
        let username = get_input("Username: ")?;
        let password = get_input("Password: ")?;
        let outcome = client.auth().login(username, password).await?;
        println!("✅ Logged in as {} ({})", outcome.user().username, outcome.user().role);
        println!("   Next page: {}", outcome.redirect_to);
    }

    if let Some(user) = client.session().user() {
        println!("\n📋 Navigation");
        for item in client.gate().routes().navigation(user.role) {
            println!("   {:<20} {}", item.title, item.href);
        }
    }

    println!("\n🚦 Gate checks");
    for path in ["/dashboard", "/manager/team", "/admin/employees", "/timesheets/1"] {
        let decision = client.gate().navigate(path);
        match client.gate().redirect_target(&decision) {
            Some(target) => println!("   {path:<20} -> {target}"),
            None => println!("   {path:<20} {decision:?}"),
        }
    }

    if client.gate().navigate("/dashboard") == GateDecision::Allow {
        let dashboard = client.employee().dashboard().await?;
        let info = &dashboard.personal_info;
        println!("\n👤 {} {} <{}>", info.first_name, info.last_name, info.email);
        if let Some(status) = dashboard.stats.current_timesheet_status {
            println!("   Current timesheet: {}", status.as_str());
        }
        if let Some(pending) = dashboard.stats.pending_timesheets {
            println!("   Pending team timesheets: {pending}");
        }
        println!("   Recent activity: {} item(s)", dashboard.recent_activity.len());
    } else {
        println!("\n🔐 Password change required before the dashboard is available");
    }

    if get_input_with_default("Log out? (y/n)", "n")?.eq_ignore_ascii_case("y") {
        client.auth().logout().await;
        println!("👋 Logged out");
    }

    watcher.abort();
    Ok(())
}

fn get_input(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn get_input_with_default(prompt: &str, default: &str) -> io::Result<String> {
    let input = get_input(&format!("{prompt} [{default}]: "))?;
    Ok(if input.is_empty() { default.to_string() } else { input })
}
