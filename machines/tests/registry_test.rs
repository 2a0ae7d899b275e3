use ale_machines::cartridge::{Cartridge, CartridgeError};
use ale_machines::games::tally::{TALLY_CRC32, TALLY_ROM};
use ale_machines::registry;

#[test]
fn test_tally_is_registered() {
    let names: Vec<_> = registry::all().iter().map(|e| e.name).collect();
    assert!(names.contains(&"tally"));
    let entry = registry::find("tally").unwrap();
    assert_eq!(entry.crc32, &[TALLY_CRC32]);
    assert!(!entry.settings.minimal_actions().is_empty());
}

#[test]
fn test_identify_by_checksum_ignores_name() {
    let cart = Cartridge::from_bytes("renamed", TALLY_ROM.to_vec()).unwrap();
    assert_eq!(registry::identify(&cart).unwrap().name, "tally");
}

#[test]
fn test_identify_falls_back_to_name() {
    let mut rom = TALLY_ROM.to_vec();
    rom[0x400] ^= 0xFF; // unused fill byte, different checksum
    let cart = Cartridge::from_bytes("tally", rom).unwrap();
    assert_eq!(registry::identify(&cart).unwrap().name, "tally");
}

#[test]
fn test_unknown_cartridge_is_rejected() {
    let cart = Cartridge::from_bytes("mystery", vec![0u8; 0x1000]).unwrap();
    assert!(matches!(
        registry::identify(&cart),
        Err(CartridgeError::Unrecognized { .. })
    ));
}

#[test]
fn test_bundled_image_round_trips() {
    let cart = registry::find("tally").unwrap().bundled_cartridge().unwrap();
    assert_eq!(cart.crc32(), TALLY_CRC32);
    assert_eq!(cart.name(), "tally");
}
