use std::fs::File;
use std::io::Error;
use std::path::Path;

/// Writes a script with `suppliers` verified suppliers, each credited and
/// requesting one payout.
pub fn generate_script(path: &Path, suppliers: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["op", "actor", "entity", "amount", "note"])?;
    wtr.write_record(["register_admin", "dana", "", "", ""])?;

    for i in 1..=suppliers {
        let name = format!("supplier-{i}");
        let batch = format!("batch-{i}");
        let payout = format!("payout-{i}");
        wtr.write_record(["register_supplier", &name, "", "", ""])?;
        wtr.write_record(["profile", &name, "", "", "IBAN|pay@example.com"])?;
        wtr.write_record(["submit", &name, &batch, "", "registration:docs"])?;
        wtr.write_record(["claim", "dana", &batch, "", ""])?;
        wtr.write_record(["verify", "dana", &batch, "", ""])?;
        wtr.write_record(["credit", "dana", &name, "100", ""])?;
        wtr.write_record(["request", &name, &payout, "40", ""])?;
        wtr.write_record(["approve", "dana", &payout, "", ""])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Keeps appending supplier lifecycles until the file reaches `size_mb`.
pub fn generate_large_script(path: &Path, size_mb: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(["op", "actor", "entity", "amount", "note"])?;
    wtr.write_record(["register_admin", "dana", "", "", ""])?;

    let target_size = (size_mb * 1024 * 1024) as u64;
    let mut i = 1;

    // Check size every 1000 lifecycles to avoid syscall overhead
    loop {
        for _ in 0..1000 {
            let name = format!("supplier-{i}");
            let batch = format!("batch-{i}");
            wtr.write_record(["register_supplier", &name, "", "", ""])?;
            wtr.write_record(["submit", &name, &batch, "", "registration:docs"])?;
            wtr.write_record(["claim", "dana", &batch, "", ""])?;
            wtr.write_record(["verify", "dana", &batch, "", ""])?;
            wtr.write_record(["credit", "dana", &name, "1", ""])?;
            i += 1;
        }
        wtr.flush()?; // Flush to ensure file size is updated
        if std::fs::metadata(path)?.len() >= target_size {
            break;
        }
    }
    Ok(())
}
