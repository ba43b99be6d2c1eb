#[cfg(test)]
mod tests {
    use chrono::Utc;
    use classdesk::db::db::Db;
    use classdesk::db::tasks::Tasks;
    use classdesk::db::users::Users;
    use classdesk::libs::auth::Identity;
    use classdesk::libs::error::ServiceError;
    use classdesk::libs::lifecycle::TaskService;
    use classdesk::libs::messages::Message;
    use classdesk::libs::task::{CreateTaskRequest, StatusUpdateRequest, TaskScope, TaskStatus};
    use classdesk::libs::user::{NewUser, Role, User};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct LifecycleTestContext {
        _temp_dir: TempDir,
        db: Db,
        admin: Identity,
        ann: Identity,
        bob: Identity,
    }

    impl TestContext for LifecycleTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            std::env::set_var("HOME", temp_dir.path());
            std::env::set_var("LOCALAPPDATA", temp_dir.path());
            let db = Db::open(&temp_dir.path().join("classdesk.db")).unwrap();

            let admin = Identity::from(&add_user(&db, "Root", Role::Admin));
            let ann = Identity::from(&add_user(&db, "Ann", Role::Student));
            let bob = Identity::from(&add_user(&db, "Bob", Role::Student));

            LifecycleTestContext {
                _temp_dir: temp_dir,
                db,
                admin,
                ann,
                bob,
            }
        }
    }

    fn add_user(db: &Db, name: &str, role: Role) -> User {
        let new_user = NewUser {
            name: name.to_string(),
            email: format!("{}@school.edu", name.to_lowercase()),
            password_hash: "unused".to_string(),
            role,
        };
        Users::new(&db.conn).insert(&new_user, Utc::now()).unwrap()
    }

    fn request(title: &str, assigned_to: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            title: Some(title.to_string()),
            description: Some("Read chapter 1".to_string()),
            assigned_to: Some(assigned_to.to_string()),
            due_date: Some("2030-01-01".to_string()),
        }
    }

    fn status(value: &str) -> StatusUpdateRequest {
        StatusUpdateRequest {
            status: Some(value.to_string()),
        }
    }

    fn fields(err: ServiceError) -> Vec<String> {
        match err {
            ServiceError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_create_enriches_and_starts_pending(ctx: &mut LifecycleTestContext) {
        let service = TaskService::new(&ctx.db.conn);
        let task = service.create(&ctx.admin, &request("HW1", &ctx.ann.id)).unwrap();

        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.completed_at.is_none());
        let assignee = task.assigned_to.unwrap();
        assert_eq!((assignee.name.as_str(), assignee.email.as_str()), ("Ann", "ann@school.edu"));
        assert_eq!(task.created_by.unwrap().id, ctx.admin.id);
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_students_cannot_create_or_delete(ctx: &mut LifecycleTestContext) {
        let service = TaskService::new(&ctx.db.conn);
        assert!(matches!(
            service.create(&ctx.ann, &request("HW1", &ctx.ann.id)),
            Err(ServiceError::Forbidden)
        ));

        let task = service.create(&ctx.admin, &request("HW1", &ctx.ann.id)).unwrap();
        assert!(matches!(service.delete(&ctx.ann, &task.id), Err(ServiceError::Forbidden)));
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_invalid_creation_persists_nothing(ctx: &mut LifecycleTestContext) {
        let service = TaskService::new(&ctx.db.conn);

        let blank = CreateTaskRequest {
            title: Some("  ".to_string()),
            due_date: Some("soon".to_string()),
            ..request("", &ctx.ann.id)
        };
        assert_eq!(fields(service.create(&ctx.admin, &blank).unwrap_err()), vec!["title", "due_date"]);

        // An admin is not a student, and neither is an unknown id.
        let to_admin = service.create(&ctx.admin, &request("HW1", &ctx.admin.id)).unwrap_err();
        assert_eq!(fields(to_admin), vec!["assigned_to"]);
        let to_nobody = CreateTaskRequest {
            title: None,
            ..request("", "ghost")
        };
        assert_eq!(fields(service.create(&ctx.admin, &to_nobody).unwrap_err()), vec!["title", "assigned_to"]);

        assert!(Tasks::new(&ctx.db.conn).fetch(&TaskScope::All).unwrap().is_empty());
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_listing_is_scoped_to_the_caller(ctx: &mut LifecycleTestContext) {
        let service = TaskService::new(&ctx.db.conn);
        service.create(&ctx.admin, &request("HW1", &ctx.ann.id)).unwrap();
        service.create(&ctx.admin, &request("HW2", &ctx.bob.id)).unwrap();
        service.create(&ctx.admin, &request("HW3", &ctx.ann.id)).unwrap();

        let titles = |caller: &Identity| -> Vec<String> { service.list(caller).unwrap().into_iter().map(|t| t.title).collect() };
        assert_eq!(titles(&ctx.admin), vec!["HW3", "HW2", "HW1"]);
        assert_eq!(titles(&ctx.ann), vec!["HW3", "HW1"]);
        assert_eq!(titles(&ctx.bob), vec!["HW2"]);
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_status_transitions(ctx: &mut LifecycleTestContext) {
        let service = TaskService::new(&ctx.db.conn);
        let task = service.create(&ctx.admin, &request("HW1", &ctx.ann.id)).unwrap();

        let before = Utc::now();
        let done = service.set_status(&ctx.ann, &task.id, &status("completed")).unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        assert!(done.completed_at.unwrap() >= before);
        assert_eq!(done.assigned_to.unwrap().id, ctx.ann.id);

        let reopened = service.set_status(&ctx.ann, &task.id, &status("pending")).unwrap();
        assert_eq!(reopened.status, TaskStatus::Pending);
        assert!(reopened.completed_at.is_none());
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_foreign_and_missing_tasks_look_the_same(ctx: &mut LifecycleTestContext) {
        let service = TaskService::new(&ctx.db.conn);
        let task = service.create(&ctx.admin, &request("HW1", &ctx.ann.id)).unwrap();

        for (caller, id) in [(&ctx.bob, task.id.as_str()), (&ctx.admin, task.id.as_str()), (&ctx.ann, "missing")] {
            let err = service.set_status(caller, id, &status("completed")).unwrap_err();
            assert!(matches!(err, ServiceError::NotFound(Message::TaskNotFound)));
        }

        let untouched = Tasks::new(&ctx.db.conn).get_by_id(&task.id).unwrap().unwrap();
        assert_eq!(untouched.status, TaskStatus::Pending);
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_invalid_status_is_rejected_before_lookup(ctx: &mut LifecycleTestContext) {
        let service = TaskService::new(&ctx.db.conn);

        assert_eq!(fields(service.set_status(&ctx.ann, "missing", &status("archived")).unwrap_err()), vec!["status"]);
        let empty = StatusUpdateRequest { status: None };
        assert_eq!(fields(service.set_status(&ctx.ann, "missing", &empty).unwrap_err()), vec!["status"]);
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_delete_is_repeatable(ctx: &mut LifecycleTestContext) {
        let service = TaskService::new(&ctx.db.conn);
        let task = service.create(&ctx.admin, &request("HW1", &ctx.ann.id)).unwrap();

        service.delete(&ctx.admin, &task.id).unwrap();
        for _ in 0..2 {
            assert!(matches!(
                service.delete(&ctx.admin, &task.id),
                Err(ServiceError::NotFound(Message::TaskNotFound))
            ));
        }
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_completion_stats(ctx: &mut LifecycleTestContext) {
        let service = TaskService::new(&ctx.db.conn);
        let hw1 = service.create(&ctx.admin, &request("HW1", &ctx.ann.id)).unwrap();
        service.create(&ctx.admin, &request("HW2", &ctx.bob.id)).unwrap();
        let hw3 = service.create(&ctx.admin, &request("HW3", &ctx.bob.id)).unwrap();
        service.set_status(&ctx.ann, &hw1.id, &status("completed")).unwrap();
        service.set_status(&ctx.bob, &hw3.id, &status("completed")).unwrap();

        let stats = service.completion_stats(&ctx.admin).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].student_name, "Ann");
        assert_eq!((stats[0].total_tasks, stats[0].completed_tasks), (1, 1));
        assert_eq!(stats[0].completion_rate, 100.0);
        assert_eq!(stats[1].student_name, "Bob");
        assert_eq!(stats[1].completion_rate, 50.0);

        for row in &stats {
            assert!((0.0..=100.0).contains(&row.completion_rate));
            assert_eq!(row.completion_rate == 0.0, row.completed_tasks == 0);
        }

        assert!(matches!(service.completion_stats(&ctx.ann), Err(ServiceError::Forbidden)));
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_students_without_tasks_are_not_in_stats(ctx: &mut LifecycleTestContext) {
        let service = TaskService::new(&ctx.db.conn);
        assert!(service.completion_stats(&ctx.admin).unwrap().is_empty());

        service.create(&ctx.admin, &request("HW1", &ctx.bob.id)).unwrap();
        let stats = service.completion_stats(&ctx.admin).unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].student_id, ctx.bob.id);
        assert_eq!(stats[0].completion_rate, 0.0);
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_delete_student_cascades(ctx: &mut LifecycleTestContext) {
        let service = TaskService::new(&ctx.db.conn);
        let hw1 = service.create(&ctx.admin, &request("HW1", &ctx.ann.id)).unwrap();
        service.create(&ctx.admin, &request("HW2", &ctx.ann.id)).unwrap();
        service.create(&ctx.admin, &request("HW3", &ctx.bob.id)).unwrap();
        service.set_status(&ctx.ann, &hw1.id, &status("completed")).unwrap();

        assert_eq!(service.delete_student(&ctx.admin, &ctx.ann.id).unwrap(), 2);

        assert!(Users::new(&ctx.db.conn).get_by_id(&ctx.ann.id).unwrap().is_none());
        let remaining = service.list(&ctx.admin).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title, "HW3");
        let stats = service.completion_stats(&ctx.admin).unwrap();
        assert!(stats.iter().all(|row| row.student_id != ctx.ann.id));
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_delete_student_rejects_non_students(ctx: &mut LifecycleTestContext) {
        let service = TaskService::new(&ctx.db.conn);

        for id in [ctx.admin.id.as_str(), "ghost"] {
            assert!(matches!(
                service.delete_student(&ctx.admin, id),
                Err(ServiceError::NotFound(Message::StudentNotFound))
            ));
        }
        assert!(Users::new(&ctx.db.conn).get_by_id(&ctx.admin.id).unwrap().is_some());
        assert!(matches!(service.delete_student(&ctx.bob, &ctx.ann.id), Err(ServiceError::Forbidden)));
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_dangling_creator_enriches_to_none(ctx: &mut LifecycleTestContext) {
        let service = TaskService::new(&ctx.db.conn);
        let other_admin = Identity::from(&add_user(&ctx.db, "Temp", Role::Admin));
        service.create(&other_admin, &request("HW1", &ctx.ann.id)).unwrap();
        Users::new(&ctx.db.conn).delete(&other_admin.id).unwrap();

        let tasks = service.list(&ctx.ann).unwrap();
        assert!(tasks[0].created_by.is_none());
        assert_eq!(tasks[0].assigned_to.as_ref().unwrap().id, ctx.ann.id);
    }

    #[test_context(LifecycleTestContext)]
    #[test]
    fn test_student_performance(ctx: &mut LifecycleTestContext) {
        let service = TaskService::new(&ctx.db.conn);

        let idle = service.student_performance(&ctx.admin, &ctx.bob.id).unwrap();
        assert_eq!((idle.task_stats.total, idle.task_stats.pending), (0, 0));
        assert_eq!(idle.completion_rate, 0.0);
        assert!(idle.recent_tasks.is_empty());

        let mut ids = Vec::new();
        for i in 1..=6 {
            ids.push(service.create(&ctx.admin, &request(&format!("HW{}", i), &ctx.ann.id)).unwrap().id);
        }
        service.set_status(&ctx.ann, &ids[0], &status("completed")).unwrap();
        service.set_status(&ctx.ann, &ids[1], &status("completed")).unwrap();

        let report = service.student_performance(&ctx.admin, &ctx.ann.id).unwrap();
        assert_eq!(report.student.email, "ann@school.edu");
        assert_eq!((report.task_stats.total, report.task_stats.completed, report.task_stats.pending), (6, 2, 4));
        assert!((report.completion_rate - 100.0 / 3.0).abs() < 1e-9);
        let recent: Vec<&str> = report.recent_tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(recent, vec!["HW6", "HW5", "HW4", "HW3", "HW2"]);
        assert_eq!(report.recent_tasks[0].created_by.as_ref().unwrap().name, "Root");

        assert!(matches!(
            service.student_performance(&ctx.admin, &ctx.admin.id),
            Err(ServiceError::NotFound(Message::StudentNotFound))
        ));
    }
}
