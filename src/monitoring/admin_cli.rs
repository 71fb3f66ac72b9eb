use std::io::{stdin, stdout, Write};

use crate::communication::messages::DashboardCommand;
use crate::monitoring::dashboard_controller::DashboardSnapshot;
use crate::monitoring::incidents::{Incident, IncidentId};
use crate::monitoring::renderer::{render_incident, render_text};
use crate::monitoring::runtime::SharedDashboard;
use crate::simulation_engine::junctions::{JunctionId, Phase};

/// What the operator picked from the menu.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuAction {
    Show,
    ViewIncident(IncidentId),
    Dispatch(DashboardCommand),
    Exit,
    Invalid(String),
}

fn print_menu() {
    println!("\nJunction Dashboard Admin CLI");
    println!("1. Display Dashboard");
    println!("2. Select Junction");
    println!("3. Toggle Emergency Mode");
    println!("4. Toggle Manual Override");
    println!("5. Set Signal Phase (selected junction)");
    println!("6. Emergency Preemption (selected junction)");
    println!("7. Resolve Incident");
    println!("8. Accept AI Recommendation");
    println!("9. Decline AI Recommendation");
    println!("10. Toggle Junction Popup");
    println!("11. View Incident");
    println!("12. Exit");
}

// Reads one line from stdin after printing a prompt. None on EOF.
fn prompt(message: &str) -> Option<String> {
    print!("{}", message);
    let _ = stdout().flush();
    let mut input = String::new();
    match stdin().read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input.trim().to_string()),
    }
}

// Lets the operator pick by list number or by id.
fn pick_junction(
    snapshot: &DashboardSnapshot,
    ask: &mut dyn FnMut(&str) -> Option<String>,
) -> Option<JunctionId> {
    for (idx, junction) in snapshot.junctions.iter().enumerate() {
        println!("  {}. {} ({})", idx + 1, junction.name, junction.id);
    }
    let answer = ask("Junction (number or id): ")?;
    match answer.parse::<usize>() {
        Ok(n) if n >= 1 && n <= snapshot.junctions.len() => {
            Some(snapshot.junctions[n - 1].id.clone())
        }
        _ => Some(JunctionId::new(answer)),
    }
}

fn find_incident(snapshot: &DashboardSnapshot, id: IncidentId) -> Option<&Incident> {
    snapshot
        .active_incidents
        .iter()
        .chain(&snapshot.resolved_incidents)
        .find(|i| i.id == id)
}

/// Turns a menu choice plus follow-up answers into an action.
pub fn menu_action(
    choice: &str,
    snapshot: &DashboardSnapshot,
    ask: &mut dyn FnMut(&str) -> Option<String>,
) -> MenuAction {
    let Ok(choice) = choice.trim().parse::<u32>() else {
        return MenuAction::Invalid(format!("'{}' is not a menu number", choice.trim()));
    };
    let command = match choice {
        1 => return MenuAction::Show,
        2 => match pick_junction(snapshot, ask) {
            Some(junction_id) => DashboardCommand::SelectJunction { junction_id },
            None => return MenuAction::Exit,
        },
        3 => DashboardCommand::ToggleEmergencyMode,
        4 => DashboardCommand::ToggleManualOverride,
        5 => {
            let labels: Vec<&str> = Phase::MANUAL_CONTROLS.iter().map(|p| p.label()).collect();
            let Some(answer) = ask(&format!("Phase ({}): ", labels.join(", "))) else {
                return MenuAction::Exit;
            };
            match answer.parse::<Phase>() {
                Ok(phase) => DashboardCommand::SetPhase { phase },
                Err(e) => return MenuAction::Invalid(e),
            }
        }
        6 => DashboardCommand::EmergencyPreemption,
        7 => {
            for incident in &snapshot.active_incidents {
                println!("  #{} {} - {}", incident.id, incident.location, incident.message);
            }
            let Some(answer) = ask("Incident id: ") else {
                return MenuAction::Exit;
            };
            let Ok(incident_id) = answer.parse::<u64>() else {
                return MenuAction::Invalid(format!("'{}' is not an incident id", answer));
            };
            let actions = snapshot
                .active_incidents
                .iter()
                .find(|i| i.id == incident_id)
                .map(|i| i.actions.clone())
                .unwrap_or_default();
            for (idx, action) in actions.iter().enumerate() {
                println!("  {}. {}", idx + 1, action);
            }
            let Some(answer) = ask("Action (number or text): ") else {
                return MenuAction::Exit;
            };
            let action = match answer.parse::<usize>() {
                Ok(n) if n >= 1 && n <= actions.len() => actions[n - 1].clone(),
                _ => answer,
            };
            DashboardCommand::ResolveIncident {
                incident_id,
                action,
            }
        }
        8 => DashboardCommand::AcceptRecommendation,
        9 => DashboardCommand::DeclineRecommendation,
        10 => match pick_junction(snapshot, ask) {
            Some(junction_id) => DashboardCommand::TogglePopup { junction_id },
            None => return MenuAction::Exit,
        },
        11 => {
            for incident in snapshot
                .active_incidents
                .iter()
                .chain(&snapshot.resolved_incidents)
            {
                println!("  #{} {} - {}", incident.id, incident.location, incident.message);
            }
            let Some(answer) = ask("Incident id: ") else {
                return MenuAction::Exit;
            };
            return match answer.parse::<u64>() {
                Ok(id) if find_incident(snapshot, id).is_some() => MenuAction::ViewIncident(id),
                _ => MenuAction::Invalid(format!("no incident '{}'", answer)),
            };
        }
        12 => return MenuAction::Exit,
        other => return MenuAction::Invalid(format!("no menu entry {}", other)),
    };
    MenuAction::Dispatch(command)
}

/// Interactive admin menu on stdin. Blocking, so run it on a blocking thread.
pub fn run_cli(dashboard: SharedDashboard) {
    let mut ask = |message: &str| prompt(message);
    loop {
        print_menu();
        let Some(choice) = prompt("Enter your choice: ") else {
            break;
        };
        let snapshot = dashboard.blocking_lock().snapshot();
        match menu_action(&choice, &snapshot, &mut ask) {
            MenuAction::Show => println!("{}", render_text(&snapshot)),
            MenuAction::ViewIncident(id) => {
                if let Some(incident) = find_incident(&snapshot, id) {
                    println!("{}", render_incident(incident));
                }
            }
            MenuAction::Dispatch(command) => {
                let result = dashboard.blocking_lock().dispatch(command);
                match result {
                    Ok(()) => println!("{}", render_text(&dashboard.blocking_lock().snapshot())),
                    Err(e) => eprintln!("Command rejected: {}", e),
                }
            }
            MenuAction::Exit => {
                println!("Exiting CLI.");
                break;
            }
            MenuAction::Invalid(reason) => println!("Invalid choice: {}. Try again.", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_system::signal_phase_engine::PhaseTimings;
    use crate::monitoring::dashboard_controller::DashboardController;
    use crate::simulation_engine::perturbation::RngSource;

    fn snapshot() -> DashboardSnapshot {
        DashboardController::demo(PhaseTimings::default(), Box::new(RngSource::seeded(2)))
            .unwrap()
            .snapshot()
    }

    fn scripted(answers: &[&str]) -> impl FnMut(&str) -> Option<String> {
        let mut answers: Vec<String> = answers.iter().rev().map(|s| s.to_string()).collect();
        move |_: &str| answers.pop()
    }

    #[test]
    fn simple_choices() {
        let snap = snapshot();
        let mut ask = scripted(&[]);
        assert_eq!(menu_action("1", &snap, &mut ask), MenuAction::Show);
        assert_eq!(
            menu_action("4", &snap, &mut ask),
            MenuAction::Dispatch(DashboardCommand::ToggleManualOverride)
        );
        assert_eq!(menu_action("12", &snap, &mut ask), MenuAction::Exit);
        assert!(matches!(menu_action("abc", &snap, &mut ask), MenuAction::Invalid(_)));
        assert!(matches!(menu_action("42", &snap, &mut ask), MenuAction::Invalid(_)));
    }

    #[test]
    fn select_by_number_or_id() {
        let snap = snapshot();
        let mut ask = scripted(&["2", "ecr-mahabalipuram"]);
        assert_eq!(
            menu_action("2", &snap, &mut ask),
            MenuAction::Dispatch(DashboardCommand::SelectJunction {
                junction_id: JunctionId::from("omr-sholinganallur")
            })
        );
        assert_eq!(
            menu_action("2", &snap, &mut ask),
            MenuAction::Dispatch(DashboardCommand::SelectJunction {
                junction_id: JunctionId::from("ecr-mahabalipuram")
            })
        );
    }

    #[test]
    fn set_phase_parses_button_labels() {
        let snap = snapshot();
        let mut ask = scripted(&["EW Red", "Purple"]);
        assert_eq!(
            menu_action("5", &snap, &mut ask),
            MenuAction::Dispatch(DashboardCommand::SetPhase {
                phase: Phase::EwRed
            })
        );
        assert!(matches!(menu_action("5", &snap, &mut ask), MenuAction::Invalid(_)));
    }

    #[test]
    fn resolve_picks_offered_action_by_number() {
        let snap = snapshot();
        let mut ask = scripted(&["1", "1"]);
        assert_eq!(
            menu_action("7", &snap, &mut ask),
            MenuAction::Dispatch(DashboardCommand::ResolveIncident {
                incident_id: 1,
                action: "Clear traffic signal".to_string()
            })
        );
    }

    #[test]
    fn eof_during_follow_up_exits() {
        let snap = snapshot();
        let mut ask = scripted(&[]);
        assert_eq!(menu_action("7", &snap, &mut ask), MenuAction::Exit);
    }

    #[test]
    fn view_incident_by_id() {
        let snap = snapshot();
        let mut ask = scripted(&["1", "9"]);
        assert_eq!(menu_action("11", &snap, &mut ask), MenuAction::ViewIncident(1));
        assert!(matches!(menu_action("11", &snap, &mut ask), MenuAction::Invalid(_)));
        assert!(find_incident(&snap, 1).unwrap().vehicle.is_some());
    }
}
