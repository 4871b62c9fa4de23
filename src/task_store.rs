use crate::error::{Error, Result};
use crate::storage::KeyValueStore;
use crate::task::{NewTask, Status, Task};
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

pub const STORAGE_KEY: &str = "dailyActivityTracker";

#[derive(Debug, Default)]
struct Snapshot {
    tasks: Vec<Task>,
    skipped: usize,
}

/// Owns the persisted task list. Every operation reads the whole list from
/// storage and mutations write the whole list back before returning.
#[derive(Debug)]
pub struct TaskStore<S> {
    storage: S,
}

impl<S: KeyValueStore> TaskStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Decodes entry by entry so one bad task does not hide the rest.
    fn read(&self) -> Result<Snapshot> {
        let Some(data) = self.storage.get_item(STORAGE_KEY)? else {
            return Ok(Snapshot::default());
        };
        let entries: Vec<Value> = serde_json::from_str(&data)?;
        let mut snapshot = Snapshot::default();
        for (position, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<Task>(entry) {
                Ok(task) if !task.title.trim().is_empty() => snapshot.tasks.push(task),
                Ok(_) => {
                    warn!(position, "skipping stored task with an empty title");
                    snapshot.skipped += 1;
                }
                Err(err) => {
                    warn!(position, error = %err, "skipping unreadable stored task");
                    snapshot.skipped += 1;
                }
            }
        }
        Ok(snapshot)
    }

    /// Missing or unreadable data loads as an empty list.
    pub fn get_tasks(&self) -> Vec<Task> {
        self.read().map(|snapshot| snapshot.tasks).unwrap_or_else(|err| {
            warn!(key = STORAGE_KEY, error = %err, "stored tasks are unreadable, showing none");
            Vec::new()
        })
    }

    /// The list a mutation starts from. Fails instead of letting the write
    /// drop stored data that could not be decoded.
    fn tasks_for_update(&self) -> Result<Vec<Task>> {
        let snapshot = self.read()?;
        if snapshot.skipped > 0 {
            return Err(Error::UnreadableEntries {
                count: snapshot.skipped,
            });
        }
        Ok(snapshot.tasks)
    }

    pub fn save_tasks(&mut self, tasks: &[Task]) -> Result<()> {
        let data = serde_json::to_string(tasks)?;
        self.storage.set_item(STORAGE_KEY, &data)
    }

    pub fn add_task(&mut self, fields: NewTask) -> Result<Task> {
        let title = fields.title.trim();
        if title.is_empty() {
            return Err(Error::InvalidInput("task title is required".to_string()));
        }
        let task = Task {
            id: Utc::now().timestamp_millis(),
            title: title.to_string(),
            description: fields.description.trim().to_string(),
            date: fields.date,
            status: fields.status,
        };

        let mut tasks = self.tasks_for_update()?;
        tasks.push(task.clone());
        self.save_tasks(&tasks)?;
        debug!(id = task.id, count = tasks.len(), "added task");
        Ok(task)
    }

    pub fn set_status(&mut self, index: usize, status: Status) -> Result<()> {
        let mut tasks = self.tasks_for_update()?;
        let len = tasks.len();
        let task = tasks
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        task.status = status;
        self.save_tasks(&tasks)?;
        debug!(index, %status, "updated task status");
        Ok(())
    }

    pub fn delete_task(&mut self, index: usize) -> Result<Task> {
        let mut tasks = self.tasks_for_update()?;
        if index >= tasks.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: tasks.len(),
            });
        }
        let removed = tasks.remove(index);
        self.save_tasks(&tasks)?;
        debug!(index, id = removed.id, "deleted task");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};
    use chrono::NaiveDate;
    use std::io;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(id: i64, title: &str, status: Status) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: format!("about {title}"),
            date: date(2025, 3, 1),
            status,
        }
    }

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: String::new(),
            date: date(2025, 3, 1),
            status: Status::default(),
        }
    }

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set_item(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "quota exceeded").into())
        }
    }

    #[test]
    fn save_then_get_round_trips() {
        let mut store = TaskStore::new(MemoryStore::new());
        let tasks = vec![
            task(1, "one", Status::Planned),
            task(2, "two", Status::InProgress),
            task(3, "three", Status::Completed),
        ];

        store.save_tasks(&tasks).unwrap();

        assert_eq!(store.get_tasks(), tasks);
    }

    #[test]
    fn round_trips_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let tasks = vec![task(7, "on disk", Status::InProgress)];

        TaskStore::new(FileStore::new(dir.path()))
            .save_tasks(&tasks)
            .unwrap();

        let reopened = TaskStore::new(FileStore::new(dir.path()));
        assert_eq!(reopened.get_tasks(), tasks);
    }

    #[test]
    fn missing_key_loads_empty() {
        let store = TaskStore::new(MemoryStore::new());
        assert!(store.get_tasks().is_empty());
    }

    #[test]
    fn malformed_data_loads_empty() {
        let mut storage = MemoryStore::new();
        storage.set_item(STORAGE_KEY, "{not json").unwrap();
        let store = TaskStore::new(storage);

        assert!(store.get_tasks().is_empty());
    }

    const ONE_BAD_ENTRY: &str = r#"[{"id":1,"title":"keep me","description":"","date":"2025-03-01","status":"planned"},{"id":2,"title":"odd","description":"","date":"2025-03-01","status":"done"}]"#;

    fn stored(store: &TaskStore<MemoryStore>) -> Option<String> {
        store.storage.get_item(STORAGE_KEY).unwrap()
    }

    #[test]
    fn unreadable_entries_are_skipped_on_load() {
        let mut storage = MemoryStore::new();
        storage.set_item(STORAGE_KEY, ONE_BAD_ENTRY).unwrap();
        let store = TaskStore::new(storage);

        let tasks = store.get_tasks();

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "keep me");
    }

    #[test]
    fn mutations_do_not_overwrite_unreadable_entries() {
        let mut storage = MemoryStore::new();
        storage.set_item(STORAGE_KEY, ONE_BAD_ENTRY).unwrap();
        let mut store = TaskStore::new(storage);

        assert!(matches!(
            store.add_task(new_task("new")),
            Err(Error::UnreadableEntries { count: 1 })
        ));
        assert!(store.set_status(0, Status::Completed).is_err());
        assert!(store.delete_task(0).is_err());
        assert_eq!(stored(&store).as_deref(), Some(ONE_BAD_ENTRY));
    }

    #[test]
    fn mutations_do_not_overwrite_malformed_data() {
        let mut storage = MemoryStore::new();
        storage.set_item(STORAGE_KEY, "{not json").unwrap();
        let mut store = TaskStore::new(storage);

        assert!(matches!(store.add_task(new_task("new")), Err(Error::Json(_))));
        assert_eq!(stored(&store).as_deref(), Some("{not json"));
    }

    #[test]
    fn blank_stored_title_is_skipped() {
        let mut storage = MemoryStore::new();
        storage
            .set_item(
                STORAGE_KEY,
                r#"[{"id":1,"title":"  ","date":"2025-03-01","status":"planned"}]"#,
            )
            .unwrap();
        let store = TaskStore::new(storage);

        assert!(store.get_tasks().is_empty());
    }

    #[test]
    fn add_appends_with_trimmed_fields() {
        let mut store = TaskStore::new(MemoryStore::new());
        store.add_task(new_task("first")).unwrap();

        let added = store
            .add_task(NewTask {
                title: "  Write report ".to_string(),
                description: "  draft  ".to_string(),
                ..new_task("")
            })
            .unwrap();

        let tasks = store.get_tasks();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "first");
        assert_eq!(tasks[1], added);
        assert_eq!(added.title, "Write report");
        assert_eq!(added.description, "draft");
        assert_eq!(added.status, Status::Planned);
    }

    #[test]
    fn add_rejects_blank_title() {
        let mut store = TaskStore::new(MemoryStore::new());

        let err = store.add_task(new_task("   ")).unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(store.get_tasks().is_empty());
    }

    #[test]
    fn set_status_changes_only_status() {
        let mut store = TaskStore::new(MemoryStore::new());
        let original = task(1, "only", Status::Planned);
        store.save_tasks(std::slice::from_ref(&original)).unwrap();

        store.set_status(0, Status::Completed).unwrap();

        let tasks = store.get_tasks();
        assert_eq!(
            tasks,
            vec![Task {
                status: Status::Completed,
                ..original
            }]
        );
    }

    #[test]
    fn delete_removes_by_position() {
        let mut store = TaskStore::new(MemoryStore::new());
        let tasks = vec![
            task(1, "a", Status::Planned),
            task(2, "b", Status::Planned),
            task(3, "c", Status::Planned),
        ];
        store.save_tasks(&tasks).unwrap();

        let removed = store.delete_task(1).unwrap();

        assert_eq!(removed, tasks[1]);
        assert_eq!(store.get_tasks(), vec![tasks[0].clone(), tasks[2].clone()]);
    }

    #[test]
    fn out_of_range_index_leaves_storage_alone() {
        let mut store = TaskStore::new(MemoryStore::new());
        let tasks = vec![task(1, "a", Status::Planned)];
        store.save_tasks(&tasks).unwrap();

        assert!(matches!(
            store.set_status(1, Status::Completed),
            Err(Error::IndexOutOfRange { index: 1, len: 1 })
        ));
        assert!(matches!(
            store.delete_task(5),
            Err(Error::IndexOutOfRange { index: 5, len: 1 })
        ));
        assert_eq!(store.get_tasks(), tasks);
    }

    #[test]
    fn write_failure_is_reported() {
        let mut store = TaskStore::new(ReadOnlyStore);

        let err = store.add_task(new_task("lost")).unwrap_err();

        assert!(matches!(err, Error::Io(_)));
    }
}
