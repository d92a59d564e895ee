//! Zip archiving of report files and directories.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::UtilError;

fn archive_err(path: &Path, e: impl std::fmt::Display) -> UtilError {
    UtilError::Archive {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Zip `src` into the archive `dest`.
///
/// A directory is stored recursively under its own name as the top-level
/// folder; a file becomes a single entry named after it. The archive is
/// written to a temporary file next to `dest` and renamed into place, so a
/// failed export never leaves a truncated archive behind.
///
/// # Errors
/// Returns an error if `src` cannot be read or the archive cannot be written.
pub fn zip_path(src: &Path, dest: &Path) -> Result<(), UtilError> {
    let Some(top) = src.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return Err(archive_err(src, "path has no file name"));
    };

    let tmp_name = format!(
        ".tmp-{}-{}.zip",
        dest.file_stem().map_or_else(String::new, |s| s.to_string_lossy().into_owned()),
        std::process::id()
    );
    let tmp_path = dest
        .parent()
        .map_or_else(|| PathBuf::from(&tmp_name), |p| p.join(&tmp_name));

    let written = write_archive(src, &top, &tmp_path);
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }

    std::fs::rename(&tmp_path, dest).map_err(|source| {
        let _ = std::fs::remove_file(&tmp_path);
        UtilError::io(dest, source)
    })
}

fn write_archive(src: &Path, top: &str, out: &Path) -> Result<(), UtilError> {
    let file = File::create(out).map_err(|source| UtilError::io(out, source))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let meta = std::fs::metadata(src).map_err(|source| UtilError::io(src, source))?;
    if meta.is_dir() {
        for entry in walkdir::WalkDir::new(src).sort_by_file_name() {
            let entry = entry.map_err(|e| archive_err(src, e))?;
            let Ok(rel) = entry.path().strip_prefix(src) else {
                continue;
            };
            let mut name = top.to_owned();
            for component in rel.components() {
                name.push('/');
                name.push_str(&component.as_os_str().to_string_lossy());
            }

            if entry.file_type().is_dir() {
                zip.add_directory(name, options)
                    .map_err(|e| archive_err(out, e))?;
            } else if entry.file_type().is_file() {
                append_file(&mut zip, entry.path(), &name, options, out)?;
            }
        }
    } else {
        append_file(&mut zip, src, top, options, out)?;
    }

    let mut writer = zip.finish().map_err(|e| archive_err(out, e))?;
    writer.flush().map_err(|source| UtilError::io(out, source))
}

fn append_file<W: Write + std::io::Seek>(
    zip: &mut ZipWriter<W>,
    path: &Path,
    name: &str,
    options: SimpleFileOptions,
    out: &Path,
) -> Result<(), UtilError> {
    let mut input = File::open(path).map_err(|source| UtilError::io(path, source))?;
    zip.start_file(name, options)
        .map_err(|e| archive_err(out, e))?;
    std::io::copy(&mut input, zip).map_err(|source| UtilError::io(path, source))?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;
    use std::io::Read;

    use super::*;

    fn entry_names(archive: &Path) -> Vec<String> {
        let file = File::open(archive).unwrap();
        let mut zip = zip::ZipArchive::new(file).unwrap();
        let mut names: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn zips_directory_under_its_own_name() {
        let tmp = tempfile::tempdir().unwrap();
        let html = tmp.path().join("html");
        fs::create_dir_all(html.join("css")).unwrap();
        fs::write(html.join("index.html"), b"<html/>").unwrap();
        fs::write(html.join("css").join("style.css"), b"body{}").unwrap();

        let dest = tmp.path().join("app-html.zip");
        zip_path(&html, &dest).unwrap();

        assert_eq!(
            entry_names(&dest),
            vec!["html/", "html/css/", "html/css/style.css", "html/index.html"]
        );
    }

    #[test]
    fn zips_single_file() {
        let tmp = tempfile::tempdir().unwrap();
        let report = tmp.path().join("report.xml");
        fs::write(&report, b"<report/>").unwrap();

        let dest = tmp.path().join("app-report.xml.zip");
        zip_path(&report, &dest).unwrap();

        let mut zip = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let mut entry = zip.by_name("report.xml").unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "<report/>");
    }

    #[test]
    fn missing_source_leaves_no_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("gone.zip");

        assert!(zip_path(&tmp.path().join("gone"), &dest).is_err());
        assert!(!dest.exists());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
