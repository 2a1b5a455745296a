use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::mapping::KeyTable;

const HEADER: &str = "Note Name,MIDI Number,BTC Volume,Lower Bound,Upper Bound,Hex Color";

pub fn write_table_csv<W: Write>(table: &KeyTable, mut out: W) -> std::io::Result<()> {
    writeln!(out, "{}", HEADER)?;
    for key in table.keys() {
        writeln!(
            out,
            "{},{},{},{},{},{}",
            key.note_name,
            key.midi_number,
            key.value,
            key.lower_bound(),
            key.upper_bound(),
            key.color
        )?;
    }
    out.flush()
}

pub fn save_table_to_csv(table: &KeyTable, path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    write_table_csv(table, BufWriter::new(file))
}
