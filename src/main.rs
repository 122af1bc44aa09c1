mod buttons;
mod cli;
mod config;
mod control_loop;
mod error;
mod events;
mod services;
mod state_machine;
mod ui;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use buttons::ButtonInput;
use cli::{Cli, Command};
use config::RobotConfig;
use control_loop::ControlLoop;
use events::EventBoard;
use services::{OrderDesk, SimLocalizer, SimNavigator};
use state_machine::RobotState;
use ui::TerminalUi;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => RobotConfig::load_from(path)?,
        None => RobotConfig::load()?,
    };

    match cli.command {
        Command::Status => {
            println!("initial state: {}", RobotState::Initialization);
            println!("{config:#?}");
        }
        Command::Demo {
            table,
            fail_navigation,
        } => run_demo(config, &table, fail_navigation, cli.verbose).await?,
    }

    Ok(())
}

/// Scripted demo: simulated navigator/localizer resolve on their own tasks,
/// a scripted operator/customer presses the buttons and places one order,
/// and the control loop drives the machine through a full round trip.
async fn run_demo(
    config: RobotConfig,
    table: &str,
    fail_navigation: bool,
    verbose: bool,
) -> Result<()> {
    let board = Arc::new(EventBoard::new());
    let ui = TerminalUi::new(&config.resource_path, verbose);

    let navigator = SimNavigator::new(board.clone(), Duration::from_millis(900));
    if fail_navigation {
        navigator.fail_next_goal();
    }
    let localizer = SimLocalizer::new(board.clone(), Duration::from_millis(400));
    let reporter = Arc::new(ui.clone());
    let desk = Arc::new(OrderDesk::new(board.clone(), reporter.clone()));

    // An order placed before the robot is ready is rejected, not queued.
    desk.submit_order(table);

    spawn_demo_script(board.clone(), desk, table.to_string());

    let mut control = ControlLoop::new(
        &config,
        board.clone(),
        navigator,
        localizer,
        ui.clone(),
        reporter,
    );

    // Up to 60 seconds of simulated operation at the default rate.
    let ticks = control
        .run_until(600, |machine| !machine.completed_deliveries().is_empty())
        .await;

    ui.finish();
    for record in control.machine().completed_deliveries() {
        ui.print_record(record);
    }
    let visited: Vec<String> = control
        .machine()
        .state_history()
        .iter()
        .map(|s| s.to_string())
        .collect();
    println!(
        "\nfinished in {ticks} ticks, final state {} (visited: {})",
        control.machine().state(),
        visited.join(" → ")
    );
    Ok(())
}

/// The demo's human stand-in: places the order once the robot is at the
/// pickup point, confirms at the table, and presses green to recover from
/// the error state.
fn spawn_demo_script(
    board: Arc<EventBoard>,
    desk: Arc<OrderDesk<TerminalUi>>,
    table: String,
) {
    tokio::spawn(async move {
        let mut buttons = ButtonInput::new(board.clone());
        let mut ordered = false;
        let mut preempted = false;
        let mut interval = tokio::time::interval(Duration::from_millis(100));
        loop {
            interval.tick().await;
            match board.machine_state() {
                RobotState::AtPickup if !ordered && !board.order_in_progress() => {
                    ordered = desk.submit_order(&table);
                }
                RobotState::GotoDropoff if !preempted => {
                    // An impatient customer: preemption is a no-op once the
                    // order is accepted, so the delivery keeps going.
                    desk.preempt_order();
                    preempted = true;
                }
                RobotState::AtDropoff | RobotState::Error => buttons.press_green(),
                _ => {}
            }
        }
    });
}
