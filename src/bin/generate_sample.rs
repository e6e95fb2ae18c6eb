use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::{Format, Workbook};

const HEADERS: [&str; 6] = [
    "Drug",
    "Cancer type related",
    "Adverse Event",
    "AE category related",
    "Prescription/OTC",
    "Reported cases",
];

struct Drug {
    name: &'static str,
    cancers: &'static str,
    category: &'static str,
    prescription: &'static str,
}

static DRUGS: [Drug; 6] = [
    Drug { name: "Tamoxifen", cancers: "Breast", category: "Hormonal", prescription: "Rx" },
    Drug { name: "Cisplatin", cancers: "Lung, Ovarian, Bladder", category: "Chemotherapy", prescription: "Rx" },
    Drug { name: "Pembrolizumab", cancers: "Melanoma, Lung", category: "Immunotherapy", prescription: "Rx" },
    Drug { name: "Ondansetron", cancers: "Breast, Lung, Colorectal", category: "Supportive care", prescription: "Rx" },
    Drug { name: "Loperamide", cancers: "Colorectal", category: "Supportive care", prescription: "OTC" },
    Drug { name: "Ibuprofen", cancers: "Bone, Prostate", category: "Supportive care", prescription: "OTC" },
];

const ADVERSE_EVENTS: [&str; 6] = ["Nausea", "Fatigue", "Rash", "Diarrhea", "Headache", "Neuropathy"];

/// Minimal deterministic PRNG (xorshift64*)
struct SimpleRng(u64);

impl SimpleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        self.0.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }
}

struct Row {
    drug: &'static Drug,
    event: &'static str,
    cases: i64,
}

fn generate_rows(rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::new();
    for drug in &DRUGS {
        for &event in &ADVERSE_EVENTS {
            // Not every drug reports every event.
            if rng.below(3) == 0 {
                continue;
            }
            rows.push(Row {
                drug,
                event,
                cases: 1 + rng.below(500) as i64,
            });
        }
    }
    rows
}

fn write_xlsx(rows: &[Row], path: &str) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet().set_name("Adverse events")?;

    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, row.drug.name)?;
        sheet.write_string(r, 1, row.drug.cancers)?;
        sheet.write_string(r, 2, row.event)?;
        sheet.write_string(r, 3, row.drug.category)?;
        sheet.write_string(r, 4, row.drug.prescription)?;
        sheet.write_number(r, 5, row.cases as f64)?;
    }

    workbook.save(path).context("saving workbook")?;
    Ok(())
}

fn text_column(rows: &[Row], f: impl Fn(&Row) -> &str) -> StringArray {
    StringArray::from(rows.iter().map(f).collect::<Vec<_>>())
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new(HEADERS[0], DataType::Utf8, false),
        Field::new(HEADERS[1], DataType::Utf8, false),
        Field::new(HEADERS[2], DataType::Utf8, false),
        Field::new(HEADERS[3], DataType::Utf8, false),
        Field::new(HEADERS[4], DataType::Utf8, false),
        Field::new(HEADERS[5], DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(text_column(rows, |r| r.drug.name)),
            Arc::new(text_column(rows, |r| r.drug.cancers)),
            Arc::new(text_column(rows, |r| r.event)),
            Arc::new(text_column(rows, |r| r.drug.category)),
            Arc::new(text_column(rows, |r| r.drug.prescription)),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.cases).collect::<Vec<_>>())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng(0x9E37_79B9_7F4A_7C15);
    let rows = generate_rows(&mut rng);

    write_xlsx(&rows, "sample_adverse_events.xlsx")?;
    write_parquet(&rows, "sample_adverse_events.parquet")?;

    println!(
        "Wrote {} adverse-event rows to sample_adverse_events.xlsx and .parquet",
        rows.len()
    );
    Ok(())
}
