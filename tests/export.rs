#[cfg(test)]
mod tests {
    use classdesk::libs::export::{ExportFormat, Exporter};
    use classdesk::libs::stats::StudentCompletion;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct ExportTestContext {
        temp_dir: TempDir,
        stats: Vec<StudentCompletion>,
    }

    impl TestContext for ExportTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            std::env::set_var("HOME", temp_dir.path());
            std::env::set_var("LOCALAPPDATA", temp_dir.path());
            let stats = vec![
                StudentCompletion {
                    student_id: "s1".to_string(),
                    student_name: "Ann".to_string(),
                    student_email: "ann@school.edu".to_string(),
                    total_tasks: 2,
                    completed_tasks: 2,
                    completion_rate: 100.0,
                },
                StudentCompletion {
                    student_id: "s2".to_string(),
                    student_name: "Bob".to_string(),
                    student_email: "bob@school.edu".to_string(),
                    total_tasks: 3,
                    completed_tasks: 1,
                    completion_rate: 100.0 / 3.0,
                },
            ];
            ExportTestContext { temp_dir, stats }
        }
    }

    #[test_context(ExportTestContext)]
    #[test]
    fn test_export_csv(ctx: &mut ExportTestContext) {
        let output_path = ctx.temp_dir.path().join("stats.csv");
        Exporter::new(ExportFormat::Csv, Some(output_path.clone())).export_stats(&ctx.stats).unwrap();

        let content = std::fs::read_to_string(&output_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Student ID,Name,Email,Total,Completed,Completion %");
        assert_eq!(lines[1], "s1,Ann,ann@school.edu,2,2,100.0");
        assert_eq!(lines[2], "s2,Bob,bob@school.edu,3,1,33.3");
    }

    #[test_context(ExportTestContext)]
    #[test]
    fn test_export_json_uses_api_field_names(ctx: &mut ExportTestContext) {
        let output_path = ctx.temp_dir.path().join("stats.json");
        Exporter::new(ExportFormat::Json, Some(output_path.clone())).export_stats(&ctx.stats).unwrap();

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
        assert_eq!(json[0]["studentName"], "Ann");
        assert_eq!(json[1]["completedTasks"], 1);
        assert_eq!(json[0]["completionRate"], 100.0);
    }

    #[test_context(ExportTestContext)]
    #[test]
    fn test_export_excel(ctx: &mut ExportTestContext) {
        let output_path = ctx.temp_dir.path().join("stats.xlsx");
        Exporter::new(ExportFormat::Excel, Some(output_path.clone())).export_stats(&ctx.stats).unwrap();

        let bytes = std::fs::read(&output_path).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_default_file_name() {
        let exporter = Exporter::new(ExportFormat::Excel, None);
        let name = exporter.output_path().to_string_lossy().to_string();
        assert!(name.starts_with("classdesk_stats_"));
        assert!(name.ends_with(".xlsx"));
    }
}
