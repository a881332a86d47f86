//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `slotbook_core` linkage and backend wiring without the Flutter app.
//! - Print a one-screen dashboard for the backend selected by environment.

use chrono::Utc;
use slotbook_core::{with_schedule_service, BackendConfig, UPCOMING_DEFAULT_LIMIT};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("slotbook_core ping={}", slotbook_core::ping());
    println!("slotbook_core version={}", slotbook_core::core_version());

    let config = match BackendConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };
    println!("backend={}", config.mode());

    let now = Utc::now();
    let result = with_schedule_service(&config, |service| {
        let summary = service.dashboard_summary(now)?;
        let upcoming = service.upcoming_appointments(now, UPCOMING_DEFAULT_LIMIT)?;
        Ok((summary, upcoming))
    });

    match result {
        Ok((summary, upcoming)) => {
            println!("participants={}", summary.participants);
            println!("appointments={}", summary.appointments);
            println!("upcoming={}", summary.upcoming);
            for appointment in upcoming {
                println!(
                    "  #{} {} -> {} ({} participant(s)) {}",
                    appointment.id,
                    appointment.start_time.format("%Y-%m-%d %H:%M"),
                    appointment.end_time.format("%H:%M"),
                    appointment.participants.len(),
                    appointment.title.as_deref().unwrap_or("(untitled)")
                );
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("dashboard failed: {err}");
            ExitCode::FAILURE
        }
    }
}
