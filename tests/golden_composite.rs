use std::fs;
use std::path::PathBuf;

use image::Rgb;
use memorial_grid::rendering::layout::TILE_SIZE;
use memorial_grid::rendering::paint::solid;
use memorial_grid::rendering::raster::compose;
use memorial_grid::SourceTile;
use sha2::{Digest, Sha256};

fn golden_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("tests/goldens/expected");
    p.push(name);
    p
}

fn tile(owner: &str, rgb: [u8; 3]) -> SourceTile {
    SourceTile {
        pixels: solid(TILE_SIZE, TILE_SIZE, Rgb(rgb)),
        owner: owner.to_string(),
        is_placeholder: false,
    }
}

#[test]
fn golden_five_tile_grid_matches_fixture() {
    let tiles = vec![
        tile("v", [0xe5, 0x39, 0x35]),
        tile("ccarella", [0x43, 0xa0, 0x47]),
        tile("pedro", [0x1e, 0x88, 0xe5]),
        SourceTile::placeholder("missing"),
        tile("synth_dev", [0xfb, 0x8c, 0x00]),
    ];
    let canvas = compose(&tiles);

    // Digest the raw pixels so the golden does not depend on encoder output
    let digest = hex::encode(Sha256::digest(canvas.as_raw()));

    let expected_path = golden_path("five_tiles.sha256");
    if std::env::var("UPDATE_GOLDENS").is_ok() {
        fs::create_dir_all("tests/goldens/expected").ok();
        fs::write(&expected_path, format!("{}\n", digest)).expect("write golden");
        println!("Updated golden: {:?}", expected_path);
        return;
    }

    if !expected_path.exists() {
        println!(
            "No golden at {:?}; run with UPDATE_GOLDENS=1 to create it. Skipping.",
            expected_path
        );
        return;
    }

    let expected = fs::read_to_string(&expected_path).expect("unable to read golden");
    assert_eq!(digest, expected.trim());
}
