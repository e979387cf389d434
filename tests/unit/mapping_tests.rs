/*!
 * Tests for mapping file loading
 */

use anyhow::Result;
use doctranslate::errors::AppError;
use doctranslate::mapping::Mapping;
use crate::common;

/// Blank lines and lines without a separator are skipped
#[test]
fn test_load_withMixedLines_shouldKeepOnlyPairs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "words.txt", "foo=bar\n\nbaz\nqux=quux\n")?;

    let mapping = Mapping::load(&path)?;

    let entries: Vec<_> = mapping.iter().collect();
    assert_eq!(entries, vec![("foo", "bar"), ("qux", "quux")]);
    Ok(())
}

/// Later duplicates win
#[test]
fn test_load_withDuplicateSource_shouldKeepLastTarget() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "words.txt", "Invoice=Factura\nInvoice=Rechnung\n")?;

    let mapping = Mapping::load(&path)?;

    assert_eq!(mapping.len(), 1);
    assert_eq!(mapping.get("Invoice"), Some("Rechnung"));
    Ok(())
}

/// Windows line endings and UTF-8 content are handled
#[test]
fn test_load_withCrlfAndUnicode_shouldStripLineEndings() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "words.txt", "Straße=Street\r\nTotal=Sum=me\r\n")?;

    let mapping = Mapping::load(&path)?;

    assert_eq!(mapping.get("Straße"), Some("Street"));
    assert_eq!(mapping.get("Total"), Some("Sum=me"));
    Ok(())
}

/// A missing file is a resource error
#[test]
fn test_load_withMissingFile_shouldReturnResourceNotFound() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let missing = temp_dir.path().join("absent.txt");

    let error = Mapping::load(&missing).unwrap_err();

    assert!(matches!(
        error.downcast_ref::<AppError>(),
        Some(AppError::ResourceNotFound(path)) if *path == missing
    ));
    Ok(())
}
