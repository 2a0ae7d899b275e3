//! Cartridge images: loading, validation and identity.
//!
//! An image can come from raw bytes, a file on disk, or a `.zip` archive
//! holding exactly one image (the way ROM dumps are usually distributed).
//! Only unbanked 2 KiB and 4 KiB images are accepted.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

/// Image sizes the console can map without bank switching.
pub const CARTRIDGE_SIZES: [usize; 2] = [0x0800, 0x1000];

const MAX_IMAGE_READ: u64 = 0x1001;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors raised while loading or identifying a cartridge.
#[derive(Debug, thiserror::Error)]
pub enum CartridgeError {
    /// Underlying I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The archive could not be read.
    #[error("invalid ZIP archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The archive does not hold exactly one image.
    #[error("ZIP archive holds {0} files; expected exactly one cartridge image")]
    ArchiveEntries(usize),

    /// The image size is not one the console can map.
    #[error("cartridge image is {0} bytes; expected 2048 or 4096")]
    UnsupportedSize(usize),

    /// No registered game matches the image.
    #[error("unrecognized cartridge `{name}` (CRC32 0x{crc32:08X})")]
    Unrecognized { name: String, crc32: u32 },

    /// The game's settings leave no playable action.
    #[error("game `{0}` declares no minimal actions")]
    NoMinimalActions(&'static str),
}

// ---------------------------------------------------------------------------
// Cartridge
// ---------------------------------------------------------------------------

/// A validated cartridge image. Cloning shares the image bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cartridge {
    name: String,
    rom: Arc<[u8]>,
    crc32: u32,
}

impl Cartridge {
    /// Build a cartridge from an in-memory image.
    pub fn from_bytes(
        name: impl Into<String>,
        rom: impl Into<Arc<[u8]>>,
    ) -> Result<Self, CartridgeError> {
        let rom = rom.into();
        if !CARTRIDGE_SIZES.contains(&rom.len()) {
            return Err(CartridgeError::UnsupportedSize(rom.len()));
        }
        let crc32 = crc32fast::hash(&rom);
        Ok(Self {
            name: name.into(),
            rom,
            crc32,
        })
    }

    /// Load an image from disk. Files ending in `.zip` are unpacked; anything
    /// else is read as a raw image. The cartridge is named after the file stem.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CartridgeError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_lowercase();

        let rom = if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
        {
            read_single_zip_entry(path)?
        } else {
            std::fs::read(path)?
        };

        let cartridge = Self::from_bytes(name, rom)?;
        log::debug!(
            "read cartridge `{}` from {} (CRC32 0x{:08X})",
            cartridge.name,
            path.display(),
            cartridge.crc32
        );
        Ok(cartridge)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rom(&self) -> &[u8] {
        &self.rom
    }

    /// CRC-32 of the image, used as the cartridge identity in snapshots.
    pub fn crc32(&self) -> u32 {
        self.crc32
    }
}

/// Extract the only file of a ZIP archive, skipping directory entries.
///
/// The declared size is checked before anything is inflated, and the read is
/// capped one byte past the largest image so a lying header cannot over-read.
fn read_single_zip_entry(path: &Path) -> Result<Vec<u8>, CartridgeError> {
    let reader = BufReader::new(File::open(path)?);
    let mut archive = zip::ZipArchive::new(reader)?;

    let mut files = Vec::new();
    for i in 0..archive.len() {
        if !archive.by_index_raw(i)?.is_dir() {
            files.push(i);
        }
    }
    let [index] = files[..] else {
        return Err(CartridgeError::ArchiveEntries(files.len()));
    };

    let mut entry = archive.by_index(index)?;
    let declared = usize::try_from(entry.size()).unwrap_or(usize::MAX);
    if !CARTRIDGE_SIZES.contains(&declared) {
        return Err(CartridgeError::UnsupportedSize(declared));
    }

    let mut data = Vec::with_capacity(declared);
    (&mut entry)
        .take(MAX_IMAGE_READ)
        .read_to_end(&mut data)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn create_test_zip(dir: &Path, name: &str, files: &[(&str, &[u8])]) -> std::path::PathBuf {
        write_zip(dir, name, zip::CompressionMethod::Stored, files)
    }

    fn write_zip(
        dir: &Path,
        name: &str,
        method: zip::CompressionMethod,
        files: &[(&str, &[u8])],
    ) -> std::path::PathBuf {
        let zip_path = dir.join(name);
        let file = File::create(&zip_path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default().compression_method(method);
        for (fname, data) in files {
            zip.start_file(*fname, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
        zip_path
    }

    fn scratch_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("ale_cartridge_test_{tag}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn rejects_unmappable_sizes() {
        assert!(matches!(
            Cartridge::from_bytes("odd", vec![0u8; 3000]),
            Err(CartridgeError::UnsupportedSize(3000))
        ));
        assert!(matches!(
            Cartridge::from_bytes("empty", Vec::<u8>::new()),
            Err(CartridgeError::UnsupportedSize(0))
        ));
    }

    #[test]
    fn identity_is_crc32_of_image() {
        let cart = Cartridge::from_bytes("blank", vec![0xEAu8; 0x800]).unwrap();
        assert_eq!(cart.crc32(), crc32fast::hash(&[0xEA; 0x800]));
        assert_eq!(cart.rom().len(), 0x800);
        assert_eq!(cart.name(), "blank");
    }

    #[test]
    fn loads_raw_file_named_after_stem() {
        let dir = scratch_dir("raw");
        let path = dir.join("Blank.bin");
        std::fs::write(&path, [0u8; 0x1000]).unwrap();
        let cart = Cartridge::from_path(&path).unwrap();
        assert_eq!(cart.name(), "blank");
        assert_eq!(cart.rom().len(), 0x1000);
    }

    #[test]
    fn loads_single_image_zip() {
        let dir = scratch_dir("zip");
        let zip_path = create_test_zip(&dir, "blank.zip", &[("blank.a26", &[0xAA; 0x800])]);
        let cart = Cartridge::from_path(&zip_path).unwrap();
        assert_eq!(cart.name(), "blank");
        assert_eq!(cart.rom()[0], 0xAA);
    }

    #[test]
    fn rejects_multi_file_zip() {
        let dir = scratch_dir("multi");
        let zip_path = create_test_zip(
            &dir,
            "two.zip",
            &[("a.bin", &[0; 0x800]), ("b.bin", &[0; 0x800])],
        );
        assert!(matches!(
            Cartridge::from_path(&zip_path),
            Err(CartridgeError::ArchiveEntries(2))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            Cartridge::from_path("/nonexistent/cart.bin"),
            Err(CartridgeError::Io(_))
        ));
    }

    #[test]
    fn rejects_oversized_zip_entry_before_inflating() {
        let dir = scratch_dir("oversized");
        let big = vec![0u8; 16 << 20];
        let zip_path = write_zip(
            &dir,
            "big.zip",
            zip::CompressionMethod::Deflated,
            &[("big.a26", &big)],
        );
        // Zeros deflate to almost nothing, so the archive itself stays tiny.
        assert!(std::fs::metadata(&zip_path).unwrap().len() < 64 * 1024);
        assert!(matches!(
            Cartridge::from_path(&zip_path),
            Err(CartridgeError::UnsupportedSize(n)) if n == 16 << 20
        ));
    }

    #[test]
    fn loads_deflated_image_zip() {
        let dir = scratch_dir("deflated");
        let zip_path = write_zip(
            &dir,
            "blank.zip",
            zip::CompressionMethod::Deflated,
            &[("blank.a26", &[0x55; 0x1000])],
        );
        let cart = Cartridge::from_path(&zip_path).unwrap();
        assert_eq!(cart.rom().len(), 0x1000);
        assert_eq!(cart.rom()[0x0FFF], 0x55);
    }
}
