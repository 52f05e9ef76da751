use std::sync::Arc;
use std::thread;
use student_core::{
    decode_students, open_repository, Backend, ErrorClass, MemoryStudentStore, NewStudent,
    RegistryConfig, RepoError, SqliteStudentStore, StudentField, StudentRepository, StudentStore,
    StudentUpdate, StudentValidationError,
};

fn repositories() -> Vec<(&'static str, StudentRepository)> {
    let memory: Box<dyn StudentStore> = Box::new(MemoryStudentStore::new());
    let sqlite: Box<dyn StudentStore> = Box::new(SqliteStudentStore::open_in_memory().unwrap());
    vec![
        ("memory", StudentRepository::new(memory)),
        ("sqlite", StudentRepository::new(sqlite)),
    ]
}

#[test]
fn crud_walkthrough() {
    for (backend, repo) in repositories() {
        let ana = repo
            .add_student(&NewStudent::new("Ana", 5, "B", "555-0100"))
            .unwrap();
        assert_eq!(ana.id, 1, "{backend}");
        let leo = repo
            .add_student(&NewStudent::new("Leo", 6, "A", "555-0101"))
            .unwrap();
        assert_eq!(leo.id, 2, "{backend}");

        let listed = repo.list_students().unwrap();
        assert_eq!(listed, vec![leo.clone(), ana.clone()], "{backend}");

        let updated = repo
            .update_student(1, &StudentUpdate::default().section("C"))
            .unwrap();
        assert_eq!(updated.section, "C", "{backend}");
        assert_eq!(updated.grade, 5, "{backend}");

        repo.delete_student(2).unwrap();
        assert_eq!(repo.count_students().unwrap(), 1, "{backend}");
        let err = repo.get_student(2).unwrap_err();
        assert!(matches!(err, RepoError::NotFound(2)), "{backend}");
        assert_eq!(err.class(), ErrorClass::NotFound, "{backend}");
    }
}

#[test]
fn empty_name_is_rejected_and_nothing_is_stored() {
    for (backend, repo) in repositories() {
        let before = repo.count_students().unwrap();
        let err = repo
            .add_student(&NewStudent::new("", 5, "B", "555"))
            .unwrap_err();

        assert!(
            matches!(
                err,
                RepoError::Validation(StudentValidationError::EmptyField(StudentField::Name))
            ),
            "{backend}"
        );
        assert_eq!(err.class(), ErrorClass::Validation, "{backend}");
        assert_eq!(repo.count_students().unwrap(), before, "{backend}");
    }
}

#[test]
fn update_with_blank_field_is_rejected_before_lookup() {
    for (backend, repo) in repositories() {
        let err = repo
            .update_student(42, &StudentUpdate::default().contact("   "))
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)), "{backend}");

        let err = repo
            .update_student(42, &StudentUpdate::default().grade(3))
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(42)), "{backend}");
    }
}

#[test]
fn created_record_reads_back_equal() {
    for (backend, repo) in repositories() {
        let created = repo
            .add_student(&NewStudent::new("Mia Torres", -1, "7-C", "mia@example.com"))
            .unwrap();
        assert_eq!(repo.get_student(created.id).unwrap(), created, "{backend}");
    }
}

#[test]
fn export_decodes_to_current_listing() {
    for (backend, repo) in repositories() {
        for (name, grade) in [("Ana", 5), ("Leo", 6), ("Zoe", 4)] {
            repo.add_student(&NewStudent::new(name, grade, "A", "555"))
                .unwrap();
        }
        repo.delete_student(2).unwrap();

        let listed = repo.list_students().unwrap();
        let exported = repo.export_students().unwrap();
        assert_eq!(decode_students(&exported).unwrap(), listed, "{backend}");
    }
}

#[test]
fn export_of_empty_repository_is_empty_array() {
    for (backend, repo) in repositories() {
        assert_eq!(repo.export_students().unwrap(), b"[]\n", "{backend}");
    }
}

#[test]
fn concurrent_callers_share_one_repository() {
    for (backend, repo) in repositories() {
        let repo = Arc::new(repo);
        thread::scope(|scope| {
            for t in 0..4 {
                let repo = Arc::clone(&repo);
                scope.spawn(move || {
                    for i in 0..10 {
                        let created = repo
                            .add_student(&NewStudent::new(format!("t{t}-{i}"), i, "A", "1"))
                            .unwrap();
                        repo.update_student(created.id, &StudentUpdate::default().grade(99))
                            .unwrap();
                        let listed = repo.list_students().unwrap();
                        assert!(listed.windows(2).all(|pair| pair[0].id > pair[1].id));
                    }
                });
            }
        });

        let listed = repo.list_students().unwrap();
        assert_eq!(listed.len(), 40, "{backend}");
        assert_eq!(repo.count_students().unwrap(), 40, "{backend}");
        assert!(listed.iter().all(|s| s.grade == 99), "{backend}");
    }
}

#[test]
fn persisted_backend_survives_reopen_and_keeps_id_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let config = RegistryConfig {
        backend: Backend::Sqlite {
            path: dir.path().join("students.sqlite3"),
        },
        ..RegistryConfig::default()
    };

    let created = {
        let repo = open_repository(&config).unwrap();
        let first = repo
            .add_student(&NewStudent::new("Ana", 5, "B", "555-0100"))
            .unwrap();
        let second = repo
            .add_student(&NewStudent::new("Leo", 6, "A", "555-0101"))
            .unwrap();
        repo.delete_student(second.id).unwrap();
        first
    };

    let repo = open_repository(&config).unwrap();
    assert_eq!(repo.list_students().unwrap(), vec![created]);

    let third = repo
        .add_student(&NewStudent::new("Zoe", 4, "C", "555-0102"))
        .unwrap();
    assert_eq!(third.id, 3);
}

#[test]
fn memory_backend_starts_empty_each_time() {
    let config = RegistryConfig::default();
    {
        let repo = open_repository(&config).unwrap();
        repo.add_student(&NewStudent::new("Ana", 5, "B", "555"))
            .unwrap();
    }
    let repo = open_repository(&config).unwrap();
    assert_eq!(repo.count_students().unwrap(), 0);
}
