use std::io::{self, Write};
use std::process::ExitCode;

use shift_rota::calendar::{DayProjection, compare_projections};
use shift_rota::config::RotaConfig;
use shift_rota::employee::EmployeeId;
use shift_rota::hashing::hash_json;
use shift_rota::logging::init_logging;
use shift_rota::persistence::{
    load_projection_from_json, read_load_payload, save_projection_to_csv, save_projection_to_json,
};
use shift_rota::service::{LoadStatus, RotaService, open_sqlite};
use shift_rota::time_of_day::SlotText;

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if cell.len() > widths[ci] {
                widths[ci] = cell.len();
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&table_row(headers, &widths));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&table_row(&cells, &widths));
        out.push('\n');
    }
    out.push_str(&sep);
    out
}

fn table_row(cells: &[&str], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.iter().zip(widths) {
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(width.saturating_sub(cell.len())));
        line.push_str(" |");
    }
    line
}

fn format_slots(slots: &[SlotText]) -> String {
    slots
        .iter()
        .map(|slot| format!("{}-{}", slot.start, slot.end))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_days(days: &[DayProjection]) -> String {
    let rows: Vec<Vec<String>> = days
        .iter()
        .map(|day| {
            vec![
                day.date.to_string(),
                day.day_name.clone(),
                day.holiday_name.clone().unwrap_or_default(),
                format_slots(&day.time_slots),
            ]
        })
        .collect();
    render_text_table(&["date", "day", "holiday", "slots"], &rows)
}

fn print_help() {
    println!(
        "Commands:\n  help                                     Show this help\n  load <json_path>                         Load employees and weekly templates\n  employees                                List employees\n  month <id> <Month> <year>                Show an employee's month\n  hours <id> <Month> <year>                Total worked hours for the month\n  weeks <id>                               Show the A and B week templates\n  export <json|csv> <id> <Month> <year> <path>\n                                           Write the month projection to a file\n  verify <id> <Month> <year> <json_path>   Compare the month with a saved projection\n  hash <json_path>                         Print the content digest of a JSON file\n  report <Month> <year>                    Hours of every employee for the month\n  delete <id>                              Delete an employee and its schedule\n  reset                                    Remove all data\n  quit|exit                                Exit"
    );
}

/// Parses `<id> <Month> <year>`.
fn month_args<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
) -> Result<(EmployeeId, &'a str, i32), &'static str> {
    let (Some(id_s), Some(month), Some(year_s)) = (parts.next(), parts.next(), parts.next()) else {
        return Err("missing arguments");
    };
    let id = id_s.parse().map_err(|_| "Invalid id")?;
    let year = year_s.parse().map_err(|_| "Invalid year")?;
    Ok((id, month, year))
}

fn run_command(service: &RotaService, cmd: &str, parts: &mut std::str::SplitWhitespace<'_>) {
    match cmd {
        "help" => print_help(),
        "load" => match parts.next() {
            Some(path) => {
                let payload = match read_load_payload(path) {
                    Ok(payload) => payload,
                    Err(e) => {
                        println!("Error: {e}");
                        return;
                    }
                };
                match service.load_payload(&payload) {
                    Ok(summary) => {
                        match summary.status {
                            LoadStatus::Loaded => println!(
                                "Loaded {} employee(s) (digest {}).",
                                summary.slot_counts.len(),
                                summary.digest
                            ),
                            LoadStatus::Unchanged => {
                                println!("Payload unchanged (digest {}).", summary.digest)
                            }
                        }
                        for (name, count) in &summary.slot_counts {
                            println!("  {name}: {count} slot(s)");
                        }
                        for warning in &summary.warnings {
                            println!("Warning: {warning}");
                        }
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            None => println!("Usage: load <json_path>"),
        },
        "employees" => match service.employees() {
            Ok(employees) => {
                let rows: Vec<Vec<String>> = employees
                    .iter()
                    .map(|e| vec![e.id.to_string(), e.name.clone(), e.start_date.to_string()])
                    .collect();
                println!("{}", render_text_table(&["id", "name", "startDate"], &rows));
            }
            Err(e) => println!("Error: {e}"),
        },
        "month" | "hours" => match month_args(parts) {
            Ok((id, month, year)) => match service.monthly_hours(id, month, year) {
                Ok((projection, hours)) => {
                    if cmd == "month" {
                        println!("{}", render_days(&projection.days));
                    }
                    println!("Total hours for employee {id} in {month} {year}: {hours:.2}");
                }
                Err(e) => println!("Error: {e}"),
            },
            Err("missing arguments") => println!("Usage: {cmd} <id> <Month> <year>"),
            Err(msg) => println!("{msg}"),
        },
        "weeks" => {
            let id: EmployeeId = match parts.next().map(str::parse) {
                Some(Ok(v)) => v,
                Some(Err(_)) => {
                    println!("Invalid id");
                    return;
                }
                None => {
                    println!("Usage: weeks <id>");
                    return;
                }
            };
            match service.weeks_ab(id) {
                Ok(weeks) => {
                    for week in &weeks {
                        println!("Week {}", week.week_type);
                        for day in &week.days {
                            println!("  {:<9} {}", day.day_name, format_slots(&day.time_slots));
                        }
                    }
                }
                Err(e) => println!("Error: {e}"),
            }
        }
        "export" => {
            let Some(format) = parts.next() else {
                println!("Usage: export <json|csv> <id> <Month> <year> <path>");
                return;
            };
            let (id, month, year) = match month_args(parts) {
                Ok(args) => args,
                Err("missing arguments") => {
                    println!("Usage: export <json|csv> <id> <Month> <year> <path>");
                    return;
                }
                Err(msg) => {
                    println!("{msg}");
                    return;
                }
            };
            let Some(path) = parts.next() else {
                println!("Usage: export <json|csv> <id> <Month> <year> <path>");
                return;
            };
            let projection = match service.fetch_month(id, month, year) {
                Ok(projection) => projection,
                Err(e) => {
                    println!("Error: {e}");
                    return;
                }
            };
            let written = match format {
                "json" => save_projection_to_json(&projection.days, path),
                "csv" => save_projection_to_csv(&projection.days, path),
                _ => {
                    println!("Unknown format '{format}' (expected json or csv)");
                    return;
                }
            };
            match written {
                Ok(()) => println!("Projection exported to {path}"),
                Err(e) => println!("Error: {e}"),
            }
        }
        "verify" => {
            let (id, month, year) = match month_args(parts) {
                Ok(args) => args,
                Err("missing arguments") => {
                    println!("Usage: verify <id> <Month> <year> <json_path>");
                    return;
                }
                Err(msg) => {
                    println!("{msg}");
                    return;
                }
            };
            let Some(path) = parts.next() else {
                println!("Usage: verify <id> <Month> <year> <json_path>");
                return;
            };
            let expected = match load_projection_from_json(path) {
                Ok(days) => days,
                Err(e) => {
                    println!("Error: {e}");
                    return;
                }
            };
            match service.fetch_month(id, month, year) {
                Ok(projection) => match compare_projections(&projection.days, &expected) {
                    None => println!("Projection matches {path}"),
                    Some(diff) => println!("Projection differs: {diff}"),
                },
                Err(e) => println!("Error: {e}"),
            }
        }
        "hash" => match parts.next() {
            Some(path) => match read_load_payload(path) {
                Ok(text) => match hash_json(&text) {
                    Ok(digest) => println!("{digest}"),
                    Err(e) => println!("Error: {e}"),
                },
                Err(e) => println!("Error: {e}"),
            },
            None => println!("Usage: hash <json_path>"),
        },
        "report" => {
            let (Some(month), Some(year_s)) = (parts.next(), parts.next()) else {
                println!("Usage: report <Month> <year>");
                return;
            };
            let year: i32 = match year_s.parse() {
                Ok(v) => v,
                Err(_) => {
                    println!("Invalid year");
                    return;
                }
            };
            match service.month_report(month, year) {
                Ok(report) => {
                    let rows: Vec<Vec<String>> = report
                        .iter()
                        .map(|r| {
                            vec![
                                r.employee_id.to_string(),
                                r.name.clone(),
                                format!("{:.2}", r.total_hours),
                            ]
                        })
                        .collect();
                    println!("{}", render_text_table(&["id", "name", "hours"], &rows));
                }
                Err(e) => println!("Error: {e}"),
            }
        }
        "delete" => {
            let id: EmployeeId = match parts.next().map(str::parse) {
                Some(Ok(v)) => v,
                Some(Err(_)) => {
                    println!("Invalid id");
                    return;
                }
                None => {
                    println!("Usage: delete <id>");
                    return;
                }
            };
            match service.delete_employee(id) {
                Ok(true) => println!("Deleted employee {id}."),
                Ok(false) => println!("Employee {id} not found."),
                Err(e) => println!("Error: {e}"),
            }
        }
        "reset" => match service.reset() {
            Ok(()) => println!("All data removed."),
            Err(e) => println!("Error: {e}"),
        },
        _ => println!("Unknown command. Type 'help'."),
    }
}

fn main() -> ExitCode {
    let config = match RotaConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };
    init_logging(config.log_format, "warn");

    let service = match open_sqlite(&config) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("Could not open {}: {e}", config.database_path.display());
            return ExitCode::FAILURE;
        }
    };

    println!("Shift Rota (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        if matches!(cmd, "quit" | "exit") {
            break;
        }
        run_command(&service, cmd, &mut parts);
    }
    ExitCode::SUCCESS
}
