use schema::PokedexSource;
use std::env;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

// Compiles data/pokedex.ron into static phf tables so the bundled provider
// needs no filesystem access at runtime. Species and encounter areas are
// postcard-encoded; move powers are emitted as literals.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let source_path = Path::new("data").join("pokedex.ron");
    println!("cargo:rerun-if-changed={}", source_path.display());
    println!("cargo:rerun-if-changed=build.rs");

    let content = fs::read_to_string(&source_path)?;
    let pokedex: PokedexSource = ron::from_str(&content)?;

    let out_dir = env::var("OUT_DIR")?;
    let out_path = Path::new(&out_dir).join("pokedex_tables.rs");
    let mut file = BufWriter::new(fs::File::create(&out_path)?);

    // --- Species, keyed by lowercase name ---
    let species_names: Vec<String> = pokedex
        .species
        .iter()
        .map(|s| s.name.to_ascii_lowercase())
        .collect();
    let mut species_blobs = Vec::with_capacity(pokedex.species.len());
    for species in &pokedex.species {
        let bytes = postcard::to_allocvec(species)?;
        species_blobs.push(format!("&{:?}", bytes));
    }
    let mut species_map = phf_codegen::Map::new();
    for (name, blob) in species_names.iter().zip(species_blobs.iter()) {
        species_map.entry(name.as_str(), blob);
    }
    writeln!(
        file,
        "static SPECIES_BY_NAME: phf::Map<&'static str, &'static [u8]> = {};",
        species_map.build()
    )?;

    // --- National dex number -> name ---
    let id_values: Vec<String> = species_names.iter().map(|n| format!("{:?}", n)).collect();
    let mut id_map = phf_codegen::Map::new();
    for (species, value) in pokedex.species.iter().zip(id_values.iter()) {
        id_map.entry(species.id, value);
    }
    writeln!(
        file,
        "static SPECIES_BY_ID: phf::Map<u16, &'static str> = {};",
        id_map.build()
    )?;

    // --- Move power ---
    let move_names: Vec<String> = pokedex
        .moves
        .iter()
        .map(|m| m.name.to_ascii_lowercase())
        .collect();
    let move_values: Vec<String> = pokedex
        .moves
        .iter()
        .map(|m| match m.power {
            Some(power) => format!("Some({})", power),
            None => "None".to_string(),
        })
        .collect();
    let mut move_map = phf_codegen::Map::new();
    for (name, value) in move_names.iter().zip(move_values.iter()) {
        move_map.entry(name.as_str(), value);
    }
    writeln!(
        file,
        "static MOVE_POWER: phf::Map<&'static str, Option<u16>> = {};",
        move_map.build()
    )?;

    // --- Encounter areas ---
    let area_names: Vec<String> = pokedex.areas.iter().map(|a| a.name.clone()).collect();
    let mut area_blobs = Vec::with_capacity(pokedex.areas.len());
    for area in &pokedex.areas {
        let bytes = postcard::to_allocvec(area)?;
        area_blobs.push(format!("&{:?}", bytes));
    }
    let mut area_map = phf_codegen::Map::new();
    for (name, blob) in area_names.iter().zip(area_blobs.iter()) {
        area_map.entry(name.as_str(), blob);
    }
    writeln!(
        file,
        "static AREAS: phf::Map<&'static str, &'static [u8]> = {};",
        area_map.build()
    )?;

    // --- Roster in dex order, for starter offers ---
    let mut roster: Vec<(u16, &str)> = pokedex
        .species
        .iter()
        .zip(species_names.iter())
        .map(|(s, name)| (s.id, name.as_str()))
        .collect();
    roster.sort_by_key(|(id, _)| *id);
    let roster_names: Vec<&str> = roster.into_iter().map(|(_, name)| name).collect();
    writeln!(file, "static ROSTER: &[&str] = &{:?};", roster_names)?;

    file.flush()?;
    Ok(())
}
