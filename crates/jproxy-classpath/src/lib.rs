//! Reflective view of a Java class graph.
//!
//! [`ClassGraph`] is the narrow interface the planner consumes; [`ClassIndex`] is the in-memory
//! implementation, loaded from class directories, jars, or JSON fixtures.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use jproxy_classfile::ClassStub;

#[derive(Debug, Error)]
pub enum ClasspathError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("zip error in {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("invalid classfile {origin}: {source}")]
    ClassFile {
        origin: String,
        #[source]
        source: jproxy_classfile::Error,
    },
    #[error("invalid class graph fixture {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Resolves type references to their declarations.
///
/// Names are dotted binary names (`com.acme.Outer$Inner`).
pub trait ClassGraph {
    fn class(&self, binary_name: &str) -> Option<&ClassStub>;

    /// Every type in the graph, in a deterministic order.
    fn binary_names(&self) -> Box<dyn Iterator<Item = &str> + '_>;
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClasspathEntry {
    ClassDir(PathBuf),
    Jar(PathBuf),
}

impl ClasspathEntry {
    /// Classifies a path by shape: directories are class roots, everything else is a jar.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            ClasspathEntry::ClassDir(path)
        } else {
            ClasspathEntry::Jar(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ClasspathEntry::ClassDir(p) | ClasspathEntry::Jar(p) => p,
        }
    }
}

/// JSON shape of a class-graph fixture.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ClassGraphFixture {
    pub classes: Vec<ClassStub>,
}

impl ClassGraphFixture {
    pub fn load(path: &Path) -> Result<Self, ClasspathError> {
        let text = std::fs::read_to_string(path).map_err(|source| ClasspathError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ClasspathError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct ClassIndex {
    // BTreeMap keeps `binary_names` sorted, which makes every downstream walk reproducible.
    stubs_by_binary: BTreeMap<String, ClassStub>,
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from classpath entries. On duplicate binary names the first entry wins.
    pub fn build(entries: &[ClasspathEntry]) -> Result<Self, ClasspathError> {
        let mut index = Self::new();
        for entry in entries {
            let stubs = match entry {
                ClasspathEntry::ClassDir(dir) => index_class_dir(dir)?,
                ClasspathEntry::Jar(path) => index_jar(path)?,
            };
            let before = index.len();
            for stub in stubs {
                index.insert_if_absent(stub);
            }
            tracing::debug!(
                target: "jproxy.classpath",
                entry = %entry.path().display(),
                classes = index.len() - before,
                "indexed classpath entry"
            );
        }
        Ok(index)
    }

    pub fn from_stubs(stubs: impl IntoIterator<Item = ClassStub>) -> Self {
        let mut index = Self::new();
        for stub in stubs {
            index.insert_if_absent(stub);
        }
        index
    }

    pub fn load_json(path: &Path) -> Result<Self, ClasspathError> {
        Ok(Self::from_stubs(ClassGraphFixture::load(path)?.classes))
    }

    pub fn to_fixture(&self) -> ClassGraphFixture {
        ClassGraphFixture {
            classes: self.stubs_by_binary.values().cloned().collect(),
        }
    }

    /// Returns `false` (and keeps the existing stub) when the binary name is already indexed.
    pub fn insert_if_absent(&mut self, stub: ClassStub) -> bool {
        let binary = stub.binary_name();
        if self.stubs_by_binary.contains_key(&binary) {
            tracing::debug!(
                target: "jproxy.classpath",
                class = %binary,
                "duplicate class definition shadowed by earlier classpath entry"
            );
            return false;
        }
        self.stubs_by_binary.insert(binary, stub);
        true
    }

    pub fn len(&self) -> usize {
        self.stubs_by_binary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stubs_by_binary.is_empty()
    }
}

impl ClassGraph for ClassIndex {
    fn class(&self, binary_name: &str) -> Option<&ClassStub> {
        self.stubs_by_binary.get(binary_name)
    }

    fn binary_names(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.stubs_by_binary.keys().map(String::as_str))
    }
}

fn is_ignored_class(internal_name: &str) -> bool {
    internal_name == "module-info"
        || internal_name == "package-info"
        || internal_name.ends_with("/package-info")
}

fn stub_from_bytes(
    bytes: &[u8],
    origin: impl FnOnce() -> String,
) -> Result<Option<ClassStub>, ClasspathError> {
    let stub = ClassStub::parse(bytes).map_err(|source| ClasspathError::ClassFile {
        origin: origin(),
        source,
    })?;
    Ok((!is_ignored_class(&stub.internal_name)).then_some(stub))
}

fn index_class_dir(dir: &Path) -> Result<Vec<ClassStub>, ClasspathError> {
    let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension() == Some(OsStr::new("class")))
        .map(|entry| entry.into_path())
        .collect();
    paths.sort();

    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = std::fs::read(&path).map_err(|source| ClasspathError::Io {
            path: path.clone(),
            source,
        })?;
        if let Some(stub) = stub_from_bytes(&bytes, || path.display().to_string())? {
            out.push(stub);
        }
    }
    Ok(out)
}

fn index_jar(path: &Path) -> Result<Vec<ClassStub>, ClasspathError> {
    let zip_err = |source| ClasspathError::Zip {
        path: path.to_path_buf(),
        source,
    };
    let io_err = |source| ClasspathError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::open(path).map_err(io_err)?;
    let mut archive = zip::ZipArchive::new(file).map_err(zip_err)?;

    let mut out = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(zip_err)?;
        if !entry.is_file() {
            continue;
        }
        let name = entry.name().to_owned();
        // Multi-release variants shadow the base class; the base version is what we bind.
        if !name.ends_with(".class") || name.starts_with("META-INF/") {
            continue;
        }

        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes).map_err(io_err)?;
        if let Some(stub) = stub_from_bytes(&bytes, || format!("{}!/{name}", path.display()))? {
            out.push(stub);
        }
    }
    Ok(out)
}
