//! Token files at both ends of a refresh: the subject token we read and the access token
//! we publish.
//!
//! The access token is staged in a hidden sibling file created with owner-only permissions,
//! synced, and renamed over the destination, so readers either see the previous token or the
//! complete new one.

// std
use std::{
	ffi::OsString,
	fs::{self, File, OpenOptions},
	io::{self, Write},
};
// self
use crate::{_prelude::*, secret::TokenSecret};

/// Reads the subject token in full, without trimming or decoding.
///
/// An empty file is reported as a read failure: there is nothing to exchange yet.
pub fn read_subject_token(path: &Path) -> Result<TokenSecret> {
	let bytes = fs::read(path)
		.map_err(|source| Error::SubjectTokenRead { path: path.to_owned(), source })?;

	if bytes.is_empty() {
		return Err(Error::SubjectTokenRead {
			path: path.to_owned(),
			source: io::Error::new(io::ErrorKind::InvalidData, "subject token file is empty"),
		});
	}

	Ok(TokenSecret::new(bytes))
}

/// Replaces the contents of `path` with the access token, readable by the owner only.
pub fn write_access_token(path: &Path, token: &TokenSecret) -> Result<()> {
	persist(path, token.expose())
		.map_err(|source| Error::OutputWrite { path: path.to_owned(), source })
}

fn persist(path: &Path, contents: &[u8]) -> io::Result<()> {
	let staging = staging_path(path)?;
	let result = write_staged(&staging, contents).and_then(|()| fs::rename(&staging, path));

	if result.is_err() {
		let _ = fs::remove_file(&staging);
	}

	result
}

fn write_staged(staging: &Path, contents: &[u8]) -> io::Result<()> {
	let mut file = open_owner_only(staging)?;

	file.write_all(contents)?;
	file.sync_all()
}

fn staging_path(path: &Path) -> io::Result<PathBuf> {
	let name = path.file_name().ok_or_else(|| {
		io::Error::new(io::ErrorKind::InvalidInput, "output token path has no file name")
	})?;
	let mut staged = OsString::from(".");

	staged.push(name);
	staged.push(".tmp");

	Ok(path.with_file_name(staged))
}

#[cfg(unix)]
fn open_owner_only(path: &Path) -> io::Result<File> {
	// std
	use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

	let file = OpenOptions::new().write(true).create(true).truncate(true).mode(0o600).open(path)?;

	// `mode` only applies on creation; a leftover staging file keeps its old bits.
	file.set_permissions(fs::Permissions::from_mode(0o600))?;

	Ok(file)
}

#[cfg(not(unix))]
fn open_owner_only(path: &Path) -> io::Result<File> {
	OpenOptions::new().write(true).create(true).truncate(true).open(path)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::temp_dir;

	#[test]
	fn subject_token_is_read_verbatim() {
		let dir = temp_dir("store_read");
		let path = dir.join("sa-token");

		fs::write(&path, b"abc123\n").expect("Failed to seed subject token.");

		let token = read_subject_token(&path).expect("Subject token should be readable.");

		assert_eq!(token.expose(), b"abc123\n");

		fs::remove_dir_all(&dir).expect("Failed to clean up temporary directory.");
	}

	#[test]
	fn missing_or_empty_subject_token_is_a_read_error() {
		let dir = temp_dir("store_missing");
		let path = dir.join("sa-token");
		let err = read_subject_token(&path).expect_err("Missing file should fail.");

		assert!(matches!(
			err,
			Error::SubjectTokenRead { ref source, .. } if source.kind() == io::ErrorKind::NotFound
		));

		fs::write(&path, b"").expect("Failed to seed empty subject token.");

		let err = read_subject_token(&path).expect_err("Empty file should fail.");

		assert_eq!(err.kind(), "subject_token_read");

		fs::remove_dir_all(&dir).expect("Failed to clean up temporary directory.");
	}

	#[test]
	fn access_token_replaces_previous_contents() {
		let dir = temp_dir("store_write");
		let path = dir.join("access-token");

		fs::write(&path, b"a-much-longer-previous-token").expect("Failed to seed old token.");
		write_access_token(&path, &TokenSecret::new("xyz789"))
			.expect("Access token should be written.");

		assert_eq!(fs::read(&path).expect("Failed to read access token."), b"xyz789");
		assert!(!dir.join(".access-token.tmp").exists(), "Staging file must not linger.");

		#[cfg(unix)]
		{
			// std
			use std::os::unix::fs::PermissionsExt;

			let mode =
				fs::metadata(&path).expect("Failed to stat access token.").permissions().mode();

			assert_eq!(mode & 0o777, 0o600);
		}

		fs::remove_dir_all(&dir).expect("Failed to clean up temporary directory.");
	}

	#[test]
	fn unwritable_destination_is_an_output_error() {
		let dir = temp_dir("store_unwritable");
		let path = dir.join("missing-dir").join("access-token");
		let err = write_access_token(&path, &TokenSecret::new("xyz789"))
			.expect_err("Writing into a missing directory should fail.");

		assert!(matches!(err, Error::OutputWrite { .. }));
		assert!(!path.exists());

		fs::remove_dir_all(&dir).expect("Failed to clean up temporary directory.");
	}
}
