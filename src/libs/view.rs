use super::stats::StudentCompletion;
use super::user::UserProfile;
use prettytable::{row, Table};

pub struct View {}

impl View {
    pub fn stats(stats: &[StudentCompletion]) {
        let mut table = Table::new();

        table.add_row(row!["NAME", "EMAIL", "TOTAL", "COMPLETED", "RATE"]);
        for s in stats {
            table.add_row(row![
                s.student_name,
                s.student_email,
                r->s.total_tasks,
                r->s.completed_tasks,
                r->format!("{:.1}%", s.completion_rate)
            ]);
        }
        table.printstd();
    }

    pub fn students(students: &[UserProfile]) {
        let mut table = Table::new();

        table.add_row(row!["ID", "NAME", "EMAIL", "CREATED"]);
        for s in students {
            table.add_row(row![s.id, s.name, s.email, s.created_at.format("%Y-%m-%d %H:%M")]);
        }
        table.printstd();
    }
}
