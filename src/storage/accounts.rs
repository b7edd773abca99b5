//! Account record operations
//!
//! One regular file per account, named after the account, holding
//! NUL-terminated `name, value` pairs in insertion order. Every successful
//! mutation is journaled after the file change has reached the disk.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use tracing::info;

use crate::error::{PwmgrError, PwmgrResult};
use crate::journal::JournalEvent;

use super::file_io::{self, create_private, Swap, TempFile};
use super::record::{Property, RecordReader, MAX_NAME_LEN};
use super::Store;

/// Check that `name` can be used as an account file name
pub fn validate_account_name(name: &str) -> PwmgrResult<()> {
    if name.is_empty() {
        return Err(PwmgrError::Validation("Account name cannot be empty".into()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(PwmgrError::Validation(format!(
            "Account name is longer than {} bytes",
            MAX_NAME_LEN
        )));
    }
    if name.contains('/') || name.contains('\0') {
        return Err(PwmgrError::Validation(format!(
            "Account name '{}' contains a forbidden character",
            name
        )));
    }
    if name.starts_with('.') {
        return Err(PwmgrError::Validation(format!(
            "Account name '{}' cannot start with '.'",
            name
        )));
    }
    Ok(())
}

fn validate_property(name: &str, value: &str) -> PwmgrResult<()> {
    if name.is_empty() || name.len() > MAX_NAME_LEN || name.contains('\0') {
        return Err(PwmgrError::Validation(format!(
            "Property name must be 1 to {} bytes without NUL",
            MAX_NAME_LEN
        )));
    }
    if value.contains('\0') {
        return Err(PwmgrError::Validation(
            "Property value cannot contain NUL".into(),
        ));
    }
    Ok(())
}

fn write_error(path: &std::path::Path, err: io::Error) -> PwmgrError {
    PwmgrError::Io(format!("Failed to write '{}': {}", path.display(), err))
}

impl Store {
    fn open_account(&self, name: &str, options: &OpenOptions) -> PwmgrResult<(PathBuf, File)> {
        validate_account_name(name)?;
        let path = self.paths.account_file(name);

        match options.open(&path) {
            Ok(file) => Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(PwmgrError::account_not_found(name)),
            Err(e) => Err(PwmgrError::Io(format!(
                "Unable to access '{}' ({})",
                path.display(),
                e
            ))),
        }
    }

    /// Create an empty account
    pub fn create_account(&self, name: &str) -> PwmgrResult<()> {
        validate_account_name(name)?;
        let path = self.paths.account_file(name);

        match create_private(&path) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(PwmgrError::account_exists(name))
            }
            Err(e) => {
                return Err(PwmgrError::Io(format!(
                    "Unable to create '{}' ({})",
                    path.display(),
                    e
                )))
            }
        }

        self.journal.append(JournalEvent::AddAccount {
            account: name.to_string(),
        })?;
        info!(account = name, "account created");
        Ok(())
    }

    /// Append a property to an account
    ///
    /// The account is scanned once first; a duplicate name or a corrupt file
    /// leaves it untouched.
    pub fn append_property(&self, account: &str, property: &str, value: &str) -> PwmgrResult<()> {
        validate_property(property, value)?;
        let (path, file) = self.open_account(account, OpenOptions::new().read(true).append(true))?;

        for stored in RecordReader::new(&file, path.clone(), self.read_window) {
            if stored?.name == property.as_bytes() {
                return Err(PwmgrError::property_exists(property));
            }
        }

        let bytes = Property::new(property, value).encode();
        (&file)
            .write_all(&bytes)
            .map_err(|e| write_error(&path, e))?;
        file.sync_data().map_err(|e| write_error(&path, e))?;

        self.journal.append(JournalEvent::AddProperty {
            property: property.to_string(),
            account: account.to_string(),
            value: value.to_string(),
        })?;
        info!(account, property, "property added");
        Ok(())
    }

    /// Write the account without `property` into the scratch file
    ///
    /// Nothing visible changes until [`StagedRemoval::commit`]. Dropping the
    /// staged removal discards the scratch file.
    pub fn stage_property_removal(
        &self,
        account: &str,
        property: &str,
    ) -> PwmgrResult<StagedRemoval<'_>> {
        let (path, source) = self.open_account(account, OpenOptions::new().read(true))?;

        let temp_path = self.paths.temp_file();
        let temp = TempFile::create(temp_path.clone()).map_err(|e| {
            PwmgrError::Io(format!(
                "Unable to create '{}' ({})",
                temp_path.display(),
                e
            ))
        })?;

        let mut found = false;
        {
            let mut writer = BufWriter::new(temp.file());
            for stored in RecordReader::new(&source, path.clone(), self.read_window) {
                let stored = stored?;
                if !found && stored.name == property.as_bytes() {
                    found = true;
                    continue;
                }
                writer
                    .write_all(&stored.encode())
                    .map_err(|e| write_error(temp.path(), e))?;
            }
            writer.flush().map_err(|e| write_error(temp.path(), e))?;
        }

        if !found {
            return Err(PwmgrError::property_not_found(property));
        }
        temp.sync().map_err(|e| write_error(temp.path(), e))?;

        Ok(StagedRemoval {
            store: self,
            account: account.to_string(),
            property: property.to_string(),
            path,
            temp,
        })
    }

    /// Remove a property from an account
    pub fn remove_property(&self, account: &str, property: &str) -> PwmgrResult<()> {
        self.stage_property_removal(account, property)?.commit()
    }

    /// Delete an account and everything in it
    pub fn remove_account(&self, name: &str) -> PwmgrResult<()> {
        validate_account_name(name)?;
        let path = self.paths.account_file(name);

        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PwmgrError::account_not_found(name))
            }
            Err(e) => {
                return Err(PwmgrError::Io(format!(
                    "Unable to remove '{}' ({})",
                    path.display(),
                    e
                )))
            }
        }

        self.journal.append(JournalEvent::RemoveAccount {
            account: name.to_string(),
        })?;
        info!(account = name, "account removed");
        Ok(())
    }

    /// Stream the properties of an account
    ///
    /// Call again to start over from the first property.
    pub fn read_account(&self, name: &str) -> PwmgrResult<RecordReader<File>> {
        let (path, file) = self.open_account(name, OpenOptions::new().read(true))?;
        Ok(RecordReader::new(file, path, self.read_window))
    }

    /// Names of all accounts, sorted
    pub fn list_accounts(&self) -> PwmgrResult<Vec<String>> {
        let entries = fs::read_dir(self.paths.base_dir()).map_err(|e| {
            PwmgrError::Io(format!(
                "Unable to list '{}' ({})",
                self.paths.base_dir().display(),
                e
            ))
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Check whether an account file exists
    pub fn account_exists(&self, name: &str) -> bool {
        validate_account_name(name).is_ok() && self.paths.account_file(name).is_file()
    }
}

/// A property removal whose new content is written but not yet in place
#[derive(Debug)]
pub struct StagedRemoval<'a> {
    store: &'a Store,
    account: String,
    property: String,
    path: PathBuf,
    temp: TempFile,
}

impl StagedRemoval<'_> {
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Swap the new content in and journal the removal
    pub fn commit(self) -> PwmgrResult<()> {
        let StagedRemoval {
            store,
            account,
            property,
            path,
            temp,
        } = self;

        let swap = file_io::exchange(temp.path(), &path).map_err(|e| {
            PwmgrError::Io(format!(
                "Unable to replace '{}' ({})",
                path.display(),
                e
            ))
        })?;
        // After an exchange the scratch path holds the old content
        drop(temp);

        store.journal.append(JournalEvent::RemoveProperty {
            property: property.clone(),
            account: account.clone(),
        })?;
        info!(
            account = %account,
            property = %property,
            exchanged = swap == Swap::Exchanged,
            "property removed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PwmgrPaths, Settings};
    use crate::journal::EntryKind;
    use tempfile::TempDir;

    fn create_test_store() -> (Store, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = PwmgrPaths::with_base_dir(temp_dir.path().to_path_buf());
        let settings = Settings {
            read_window: 64,
            ..Settings::default()
        };
        let store = Store::open(paths, &settings).unwrap();
        (store, temp_dir)
    }

    fn properties(store: &Store, account: &str) -> Vec<Property> {
        store
            .read_account(account)
            .unwrap()
            .collect::<PwmgrResult<_>>()
            .unwrap()
    }

    fn journal_kinds(store: &Store) -> Vec<EntryKind> {
        store
            .journal()
            .read_all()
            .unwrap()
            .map(|entry| entry.unwrap().kind())
            .collect()
    }

    #[test]
    fn test_create_and_read_empty_account() {
        let (store, _temp) = create_test_store();
        store.create_account("github").unwrap();

        assert!(store.account_exists("github"));
        assert!(properties(&store, "github").is_empty());
        assert_eq!(journal_kinds(&store), vec![EntryKind::AddAccount]);
    }

    #[test]
    fn test_create_duplicate_account() {
        let (store, _temp) = create_test_store();
        store.create_account("github").unwrap();

        let err = store.create_account("github").unwrap_err();
        assert!(matches!(err, PwmgrError::Duplicate { .. }));
        assert_eq!(journal_kinds(&store).len(), 1);
    }

    #[test]
    fn test_invalid_account_names() {
        let (store, _temp) = create_test_store();
        let long = "a".repeat(MAX_NAME_LEN + 1);

        for name in ["", ".backup", "a/b", long.as_str()] {
            let err = store.create_account(name).unwrap_err();
            assert!(matches!(err, PwmgrError::Validation(_)), "{name:?}");
        }
        assert!(journal_kinds(&store).is_empty());
    }

    #[test]
    fn test_append_and_read_property() {
        let (store, _temp) = create_test_store();
        store.create_account("github").unwrap();
        store.append_property("github", "user", "bob").unwrap();
        store.append_property("github", "pass", "hunter2").unwrap();

        assert_eq!(
            properties(&store, "github"),
            vec![Property::new("user", "bob"), Property::new("pass", "hunter2")]
        );
        assert_eq!(
            journal_kinds(&store),
            vec![
                EntryKind::AddAccount,
                EntryKind::AddProperty,
                EntryKind::AddProperty
            ]
        );
    }

    #[test]
    fn test_read_account_restarts() {
        let (store, _temp) = create_test_store();
        store.create_account("github").unwrap();
        store.append_property("github", "user", "bob").unwrap();

        assert_eq!(properties(&store, "github").len(), 1);
        assert_eq!(properties(&store, "github").len(), 1);
    }

    #[test]
    fn test_duplicate_property_leaves_file_unchanged() {
        let (store, _temp) = create_test_store();
        store.create_account("github").unwrap();
        store.append_property("github", "user", "bob").unwrap();
        let path = store.paths().account_file("github");
        let before = fs::read(&path).unwrap();

        let err = store.append_property("github", "user", "alice").unwrap_err();
        assert!(matches!(err, PwmgrError::Duplicate { .. }));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_append_to_missing_account() {
        let (store, _temp) = create_test_store();
        let err = store.append_property("nope", "user", "bob").unwrap_err();
        assert!(err.is_not_found());
        assert!(!store.account_exists("nope"));
    }

    #[test]
    fn test_long_value_survives_small_window() {
        let (store, _temp) = create_test_store();
        let value = "v".repeat(5000);
        store.create_account("github").unwrap();
        store.append_property("github", "key", &value).unwrap();
        store.append_property("github", "user", "bob").unwrap();

        let props = properties(&store, "github");
        assert_eq!(props[0].value.len(), 5000);
        assert_eq!(props[1], Property::new("user", "bob"));
    }

    #[test]
    fn test_remove_property() {
        let (store, temp) = create_test_store();
        store.create_account("github").unwrap();
        store.append_property("github", "user", "bob").unwrap();
        store.append_property("github", "pass", "hunter2").unwrap();
        store.append_property("github", "url", "github.com").unwrap();

        store.remove_property("github", "pass").unwrap();

        assert_eq!(
            properties(&store, "github"),
            vec![Property::new("user", "bob"), Property::new("url", "github.com")]
        );
        assert!(!temp.path().join(".tmp").exists());
        assert_eq!(
            journal_kinds(&store).last(),
            Some(&EntryKind::RemoveProperty)
        );
    }

    #[test]
    fn test_remove_missing_property() {
        let (store, temp) = create_test_store();
        store.create_account("github").unwrap();
        store.append_property("github", "user", "bob").unwrap();
        let path = store.paths().account_file("github");
        let before = fs::read(&path).unwrap();

        let err = store.remove_property("github", "pass").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(fs::read(&path).unwrap(), before);
        assert!(!temp.path().join(".tmp").exists());
    }

    #[test]
    fn test_dropped_staged_removal_keeps_original() {
        let (store, temp) = create_test_store();
        store.create_account("github").unwrap();
        store.append_property("github", "user", "bob").unwrap();
        let path = store.paths().account_file("github");
        let before = fs::read(&path).unwrap();

        let staged = store.stage_property_removal("github", "user").unwrap();
        assert_eq!(staged.account(), "github");
        assert!(temp.path().join(".tmp").exists());
        drop(staged);

        assert_eq!(fs::read(&path).unwrap(), before);
        assert!(!temp.path().join(".tmp").exists());
        assert_eq!(
            journal_kinds(&store).last(),
            Some(&EntryKind::AddProperty)
        );
    }

    #[test]
    fn test_corrupt_account_is_not_modified() {
        let (store, temp) = create_test_store();
        let path = store.paths().account_file("broken");
        fs::write(&path, b"user\0bob\0pass\0").unwrap();

        let err = store.append_property("broken", "url", "x").unwrap_err();
        assert!(err.is_corrupt());
        let err = store.remove_property("broken", "pass").unwrap_err();
        assert!(err.is_corrupt());

        assert_eq!(fs::read(&path).unwrap(), b"user\0bob\0pass\0");
        assert!(!temp.path().join(".tmp").exists());
        assert!(journal_kinds(&store).is_empty());
    }

    #[test]
    fn test_remove_account() {
        let (store, _temp) = create_test_store();
        store.create_account("github").unwrap();
        store.remove_account("github").unwrap();

        assert!(!store.account_exists("github"));
        assert!(store.remove_account("github").unwrap_err().is_not_found());
        assert_eq!(
            journal_kinds(&store),
            vec![EntryKind::AddAccount, EntryKind::RemoveAccount]
        );
    }

    #[test]
    fn test_list_accounts_skips_dot_files() {
        let (store, temp) = create_test_store();
        store.create_account("mail").unwrap();
        store.create_account("github").unwrap();
        fs::create_dir(temp.path().join("subdir")).unwrap();

        assert_eq!(store.list_accounts().unwrap(), vec!["github", "mail"]);
    }
}
