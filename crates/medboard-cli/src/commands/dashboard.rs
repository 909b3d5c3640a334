//! The `medboard dashboard` command.
//!
//! Renders once, then reads `:`-commands from stdin to switch grouping or
//! demo data. Each change refetches exactly once.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use tokio::io::{AsyncBufReadExt, BufReader};

use medboard_client::{create_tutor_api, open_session};
use medboard_core::analytics::{AnalyticsPhase, AnalyticsView, ChartBar};
use medboard_core::model::{AnalyticsQuery, GroupBy};
use medboard_core::SessionGate;

use super::{follow, load_config, split_command};

const BAR_WIDTH: f64 = 20.0;

const HELP: &str = "\
Commands:
  :group <dimension>  regroup (discipline, body_system, specialty, question_type,
                      age_group, acuity, pathophysiology)
  :demo on|off        switch between demo data and your own results
  :help               show this help
  :quit               leave";

enum Action<'a> {
    Group(&'a str),
    Demo(&'a str),
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse_action(line: &str) -> Option<Action<'_>> {
    let (name, arg) = split_command(line)?;
    Some(match name {
        "g" | "group" => Action::Group(arg),
        "demo" => Action::Demo(arg),
        "h" | "help" => Action::Help,
        "q" | "quit" | "exit" => Action::Quit,
        _ => Action::Unknown(name),
    })
}

fn parse_toggle(arg: &str) -> Option<bool> {
    match arg.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

pub async fn execute(
    config_path: Option<PathBuf>,
    group_by: Option<GroupBy>,
    demo: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let session = open_session(&config)?;

    let token = match SessionGate::require_unless_demo(&session, demo) {
        Ok(token) => token,
        Err(nav) => {
            println!("No session found. Please log in.");
            return Err(follow(nav).await);
        }
    };
    let mut authenticated = token.is_some();
    let mut api = create_tutor_api(&config, token.as_ref())?;

    let query = AnalyticsQuery {
        group_by: group_by.unwrap_or(config.default_group_by),
        use_test_data: demo,
    };
    let mut view = AnalyticsView::new(session.clone(), query);

    println!("Performance Dashboard");
    if let Some(nav) = view.load(api.as_ref()).await {
        println!("Error: {}", view.error().unwrap_or_default());
        return Err(follow(nav).await);
    }
    if view.phase() == AnalyticsPhase::Error {
        anyhow::bail!("{}", view.error().unwrap_or_default());
    }
    render(&view);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(action) = parse_action(&line) else {
            if !line.trim().is_empty() {
                println!("Type :help for commands.");
            }
            continue;
        };

        let nav = match action {
            Action::Quit => break,
            Action::Help => {
                println!("{HELP}");
                continue;
            }
            Action::Unknown(name) => {
                println!("Unknown command ':{name}'. Type :help for commands.");
                continue;
            }
            Action::Group(arg) => match arg.parse::<GroupBy>() {
                Ok(group_by) if group_by == view.query().group_by => {
                    println!("Already grouped by {}.", group_by.title());
                    continue;
                }
                Ok(group_by) => view.change_group_by(api.as_ref(), group_by).await,
                Err(e) => {
                    println!("{e}. Type :help for the dimensions.");
                    continue;
                }
            },
            Action::Demo(arg) => {
                let Some(use_test_data) = parse_toggle(arg) else {
                    println!("Usage: :demo on|off");
                    continue;
                };
                if use_test_data == view.query().use_test_data {
                    println!("Already showing {}.", data_source(use_test_data));
                    continue;
                }
                if !use_test_data && !authenticated {
                    match SessionGate::require(&session) {
                        Ok(token) => {
                            api = create_tutor_api(&config, Some(&token))?;
                            authenticated = true;
                        }
                        Err(nav) => {
                            println!("Please log in to see your own results.");
                            return Err(follow(nav).await);
                        }
                    }
                }
                view.change_use_test_data(api.as_ref(), use_test_data).await
            }
        };

        render(&view);
        if let Some(nav) = nav {
            return Err(follow(nav).await);
        }
    }

    Ok(())
}

fn data_source(use_test_data: bool) -> &'static str {
    if use_test_data {
        "demo data"
    } else {
        "your results"
    }
}

fn render(view: &AnalyticsView) {
    let query = view.query();
    match view.phase() {
        AnalyticsPhase::Ready => {
            println!(
                "\nAccuracy by {} ({})",
                query.group_by.title(),
                data_source(query.use_test_data)
            );
            println!("{}", chart_table(query.group_by, view.bars()));
        }
        AnalyticsPhase::Empty => {
            println!("No performance data available yet.");
        }
        AnalyticsPhase::Error => {
            println!("Error: {}", view.error().unwrap_or_default());
        }
        AnalyticsPhase::Idle | AnalyticsPhase::Loading => {
            println!("Loading analytics...");
        }
    }
}

fn chart_table(group_by: GroupBy, bars: &[ChartBar]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![group_by.title(), "Correct", "Incorrect", "Accuracy", ""]);

    for bar in bars {
        table.add_row(vec![
            Cell::new(&bar.label),
            Cell::new(bar.correct),
            Cell::new(bar.incorrect),
            Cell::new(bar.accuracy_label()),
            Cell::new(bar_graphic(bar.accuracy_pct)),
        ]);
    }

    table
}

fn bar_graphic(accuracy_pct: f64) -> String {
    let filled = ((accuracy_pct / 100.0) * BAR_WIDTH).round() as usize;
    "#".repeat(filled.min(BAR_WIDTH as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_graphic_scales_with_accuracy() {
        assert_eq!(bar_graphic(0.0), "");
        assert_eq!(bar_graphic(50.0), "#".repeat(10));
        assert_eq!(bar_graphic(100.0), "#".repeat(20));
    }

    #[test]
    fn table_lists_each_group() {
        let bars = vec![ChartBar {
            label: "Cardio".into(),
            correct: 3,
            incorrect: 1,
            accuracy_pct: 75.0,
        }];
        let rendered = chart_table(GroupBy::Discipline, &bars).to_string();
        assert!(rendered.contains("Discipline"));
        assert!(rendered.contains("Cardio"));
        assert!(rendered.contains("75.0%"));
    }

    #[test]
    fn parses_dashboard_commands() {
        assert!(matches!(parse_action(":group body_system"), Some(Action::Group("body_system"))));
        assert!(matches!(parse_action(":demo off"), Some(Action::Demo("off"))));
        assert!(matches!(parse_action(":q"), Some(Action::Quit)));
        assert!(matches!(parse_action(":zoom"), Some(Action::Unknown("zoom"))));
        assert!(parse_action("specialty").is_none());
    }

    #[test]
    fn toggle_words() {
        assert_eq!(parse_toggle("ON"), Some(true));
        assert_eq!(parse_toggle("off"), Some(false));
        assert_eq!(parse_toggle("maybe"), None);
    }
}
