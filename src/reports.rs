//! Read-only reports over the workforce tables.
//!
//! Each report is a nested iteration over rows already fetched from the
//! database; nothing here touches the pool or persists anything. Rows with
//! missing dates are skipped, never an error.

use sqlx::types::BigDecimal;

use crate::models::{Assignment, Client, Employee, Project};

#[derive(Debug, PartialEq)]
pub struct ClientBudgetTotal {
    pub client_name: String,
    pub total_budget: BigDecimal,
}

/// Total budget across each client's projects.
pub fn budget_totals_by_client(clients: &[Client], projects: &[Project]) -> Vec<ClientBudgetTotal> {
    clients
        .iter()
        .map(|client| {
            let mut total = BigDecimal::from(0);
            for project in projects.iter().filter(|p| p.client_id == client.national_id) {
                total = &total + &project.budget;
            }
            ClientBudgetTotal {
                client_name: client.name.clone(),
                total_budget: total,
            }
        })
        .collect()
}

#[derive(Debug, PartialEq)]
pub struct RosterEntry {
    pub employee_name: String,
    /// How many projects this employee participates in overall.
    pub total_projects: usize,
}

#[derive(Debug, PartialEq)]
pub struct ProjectRoster {
    pub project_title: String,
    pub members: Vec<RosterEntry>,
}

/// Employees assigned to each project, with each one's overall
/// participation count.
pub fn rosters_by_project(
    projects: &[Project],
    employees: &[Employee],
    assignments: &[Assignment],
) -> Vec<ProjectRoster> {
    projects
        .iter()
        .map(|project| {
            let members = assignments
                .iter()
                .filter(|a| a.project_id == project.id)
                .filter_map(|a| employees.iter().find(|e| e.national_id == a.employee_id))
                .map(|employee| RosterEntry {
                    employee_name: employee.name.clone(),
                    total_projects: assignments
                        .iter()
                        .filter(|a| a.employee_id == employee.national_id)
                        .count(),
                })
                .collect();
            ProjectRoster {
                project_title: project.title.clone(),
                members,
            }
        })
        .collect()
}

#[derive(Debug, PartialEq)]
pub struct ClientTopProject {
    pub client_name: String,
    /// Highest-budget project, None when the client has no projects.
    pub project: Option<(String, BigDecimal)>,
}

/// Highest-budget project of each client. Ties keep the first project seen.
pub fn top_project_by_client(clients: &[Client], projects: &[Project]) -> Vec<ClientTopProject> {
    clients
        .iter()
        .map(|client| {
            let mut best: Option<&Project> = None;
            for project in projects.iter().filter(|p| p.client_id == client.national_id) {
                match best {
                    Some(current) if project.budget <= current.budget => {}
                    _ => best = Some(project),
                }
            }
            ClientTopProject {
                client_name: client.name.clone(),
                project: best.map(|p| (p.title.clone(), p.budget.clone())),
            }
        })
        .collect()
}

#[derive(Debug, PartialEq)]
pub struct ProjectManagerSummary {
    pub project_title: String,
    pub manager_name: String,
    pub assigned: usize,
}

/// Each project with its manager's name and assignment count.
pub fn manager_summaries(
    projects: &[Project],
    employees: &[Employee],
    assignments: &[Assignment],
) -> Vec<ProjectManagerSummary> {
    projects
        .iter()
        .filter_map(|project| {
            let manager = employees.iter().find(|e| e.national_id == project.manager_id)?;
            Some(ProjectManagerSummary {
                project_title: project.title.clone(),
                manager_name: manager.name.clone(),
                assigned: assignments.iter().filter(|a| a.project_id == project.id).count(),
            })
        })
        .collect()
}

#[derive(Debug, PartialEq)]
pub struct LongestProject {
    pub title: String,
    pub duration_days: i64,
    pub employee_count: usize,
}

#[derive(Debug, PartialEq)]
pub struct ClientLongestProject {
    pub client_name: String,
    /// None when the client has no project with both dates set.
    pub project: Option<LongestProject>,
}

/// Longest-running project of each client, with how many employees were
/// assigned to it. Projects without an end date have no duration and are
/// skipped.
pub fn longest_project_by_client(
    clients: &[Client],
    projects: &[Project],
    assignments: &[Assignment],
) -> Vec<ClientLongestProject> {
    clients
        .iter()
        .map(|client| {
            let mut best: Option<(&Project, i64)> = None;
            for project in projects.iter().filter(|p| p.client_id == client.national_id) {
                let Some(end_date) = project.end_date else {
                    continue;
                };
                let days = (end_date - project.start_date).num_days();
                if best.map_or(true, |(_, longest)| days > longest) {
                    best = Some((project, days));
                }
            }
            ClientLongestProject {
                client_name: client.name.clone(),
                project: best.map(|(project, duration_days)| LongestProject {
                    title: project.title.clone(),
                    duration_days,
                    employee_count: assignments
                        .iter()
                        .filter(|a| a.project_id == project.id)
                        .count(),
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::NaiveDate;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn money(text: &str) -> BigDecimal {
        BigDecimal::from_str(text).expect("valid decimal")
    }

    fn client(id: &str, name: &str) -> Client {
        Client {
            national_id: id.to_string(),
            name: name.to_string(),
            phone: None,
            email: format!("{id}@example.com"),
        }
    }

    fn employee(id: &str, name: &str) -> Employee {
        Employee {
            national_id: id.to_string(),
            name: name.to_string(),
            is_manager: false,
            email: format!("{id}@example.com"),
        }
    }

    fn project(
        id: i32,
        title: &str,
        client_id: &str,
        manager_id: &str,
        budget: &str,
        end_date: Option<NaiveDate>,
    ) -> Project {
        Project {
            id,
            title: title.to_string(),
            description: None,
            start_date: date(2020, 1, 1),
            end_date,
            budget: money(budget),
            client_id: client_id.to_string(),
            manager_id: manager_id.to_string(),
        }
    }

    fn assignment(employee_id: &str, project_id: i32) -> Assignment {
        Assignment {
            employee_id: employee_id.to_string(),
            project_id,
        }
    }

    #[test]
    fn budget_totals_sum_per_client() {
        let clients = [client("c1", "Acme"), client("c2", "Globex")];
        let projects = [
            project(1, "alpha", "c1", "m1", "1000.50", None),
            project(2, "beta", "c1", "m2", "2000.25", None),
            project(3, "gamma", "c2", "m3", "500.00", None),
        ];

        let totals = budget_totals_by_client(&clients, &projects);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].client_name, "Acme");
        assert_eq!(totals[0].total_budget, money("3000.75"));
        assert_eq!(totals[1].total_budget, money("500.00"));
    }

    #[test]
    fn budget_total_is_zero_for_client_without_projects() {
        let clients = [client("c1", "Acme")];

        let totals = budget_totals_by_client(&clients, &[]);

        assert_eq!(totals[0].total_budget, BigDecimal::from(0));
    }

    #[test]
    fn rosters_count_overall_participation() {
        let projects = [
            project(1, "alpha", "c1", "m1", "100.00", None),
            project(2, "beta", "c1", "m2", "100.00", None),
        ];
        let employees = [employee("e1", "Ana"), employee("e2", "Bruno")];
        let assignments = [
            assignment("e1", 1),
            assignment("e1", 2),
            assignment("e2", 2),
        ];

        let rosters = rosters_by_project(&projects, &employees, &assignments);

        assert_eq!(rosters[0].members, vec![RosterEntry {
            employee_name: "Ana".to_string(),
            total_projects: 2,
        }]);
        assert_eq!(rosters[1].members.len(), 2);
        assert_eq!(rosters[1].members[0].total_projects, 2);
        assert_eq!(rosters[1].members[1].total_projects, 1);
    }

    #[test]
    fn top_project_prefers_first_on_tie_and_handles_empty() {
        let clients = [client("c1", "Acme"), client("c2", "Globex")];
        let projects = [
            project(1, "alpha", "c1", "m1", "2000.00", None),
            project(2, "beta", "c1", "m2", "2000.00", None),
            project(3, "gamma", "c1", "m3", "900.00", None),
        ];

        let tops = top_project_by_client(&clients, &projects);

        assert_eq!(
            tops[0].project,
            Some(("alpha".to_string(), money("2000.00")))
        );
        assert_eq!(tops[1].project, None);
    }

    #[test]
    fn manager_summaries_pair_titles_with_names_and_counts() {
        let projects = [project(1, "alpha", "c1", "m1", "100.00", None)];
        let employees = [employee("m1", "Marta"), employee("e1", "Ana")];
        let assignments = [assignment("e1", 1), assignment("m1", 1)];

        let summaries = manager_summaries(&projects, &employees, &assignments);

        assert_eq!(summaries, vec![ProjectManagerSummary {
            project_title: "alpha".to_string(),
            manager_name: "Marta".to_string(),
            assigned: 2,
        }]);
    }

    #[test]
    fn longest_project_skips_rows_without_end_date() {
        let clients = [client("c1", "Acme"), client("c2", "Globex")];
        let projects = [
            project(1, "short", "c1", "m1", "100.00", Some(date(2020, 2, 1))),
            project(2, "long", "c1", "m2", "100.00", Some(date(2021, 1, 1))),
            project(3, "open", "c1", "m3", "100.00", None),
            project(4, "undated", "c2", "m4", "100.00", None),
        ];
        let assignments = [assignment("e1", 2), assignment("e2", 2)];

        let longest = longest_project_by_client(&clients, &projects, &assignments);

        assert_eq!(
            longest[0].project,
            Some(LongestProject {
                title: "long".to_string(),
                duration_days: 366,
                employee_count: 2,
            })
        );
        // Only an open-ended project: no duration to compare.
        assert_eq!(longest[1].project, None);
    }
}
