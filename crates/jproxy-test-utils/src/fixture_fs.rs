use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::classfile::ClassSpec;

/// Writes each class to `<root>/<internal name>.class`, creating package directories.
pub fn write_class_dir(root: &Path, classes: &[ClassSpec]) -> std::io::Result<()> {
    for class in classes {
        let path = root.join(format!("{}.class", class.name));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, class.encode())?;
    }
    Ok(())
}

/// Writes a jar (zip) with one entry per class plus a manifest.
pub fn write_jar(path: &Path, classes: &[ClassSpec]) -> std::io::Result<()> {
    let file = fs::File::create(path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();

    zip.start_file("META-INF/MANIFEST.MF", options)
        .map_err(std::io::Error::other)?;
    zip.write_all(b"Manifest-Version: 1.0\n")?;

    for class in classes {
        zip.start_file(format!("{}.class", class.name), options)
            .map_err(std::io::Error::other)?;
        zip.write_all(&class.encode())?;
    }
    zip.finish().map_err(std::io::Error::other)?;
    Ok(())
}

/// A temporary classes directory that lives as long as the returned guard.
pub struct ClassDirFixture {
    dir: TempDir,
}

impl ClassDirFixture {
    pub fn new(classes: &[ClassSpec]) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        write_class_dir(dir.path(), classes).expect("write class fixtures");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }
}
