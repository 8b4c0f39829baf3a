//! Terminal output formatting.

use colored::{ColoredString, Colorize};
use floorlink_core::presence::Role;
use floorlink_core::protocol::{MutationKind, TaskMutation};
use floorlink_core::roster::RosterView;

fn role_colored(role: Role) -> ColoredString {
    match role {
        Role::Admin => "admin".magenta(),
        Role::Office => "office".blue(),
        Role::Warehouse => "warehouse".yellow(),
        Role::Monitor => "monitor".cyan(),
    }
}

/// Print the online list.
pub fn print_roster(view: &RosterView) {
    let users = view.distinct_users();
    println!();
    println!(
        "{} {} ({} connections)",
        "Online".green().bold(),
        users.len(),
        view.online_count()
    );

    if users.is_empty() {
        println!("  {}", "Nobody online.".dimmed());
        return;
    }

    println!("  {:<20} {:<12} {:<10}", "User", "Role", "Since");
    println!("  {}", "─".repeat(44));
    for record in users {
        println!(
            "  {:<20} {:<12} {:<10}",
            truncate(&record.username, 18),
            role_colored(record.role),
            record.connected_at.format("%H:%M:%S").to_string()
        );
    }
}

/// Print a relayed task mutation.
pub fn print_mutation(mutation: &TaskMutation) {
    let kind = match mutation.kind {
        MutationKind::Created => "created".green(),
        MutationKind::Updated => "updated".yellow(),
        MutationKind::Deleted => "deleted".red(),
    };
    println!("{} task {} {}", "↻".cyan(), kind, mutation.payload_str().dimmed());
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("luca", 18), "luca");
        assert_eq!(truncate("bartolomeo-dalla-costa", 10), "bartolome…");
    }
}
