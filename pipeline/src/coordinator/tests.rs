use std::time::Duration;

use googletest::prelude::*;
use testutils::{WrapError, report_row, string_rows};

use super::{
    ArtifactLayout, ClassifiedPage, CombinedDocument, ConvertEvent, NoEvents, classify_document,
    combine_pages, convert_documents, extract_relevant_tables, read_combined_document,
    write_combined_document,
};
use crate::{
    classify::{PageSubtitle, TableLabel, TableType, page_table_sections},
    series::Instrument,
    table::Table,
    testutil::{FakeConverter, FakePage, FakeTextReader, RecordingEvents, report_page_text},
};

const TEN_YEAR_SUBTITLE: &str = "長期国債先物 JGB(10-year) Futures";
const TONA_SUBTITLE: &str = "3か月TONA先物 3-Month TONA Futures";
const PDF_NAME: &str = "Dec_2023_Week2_12-4_-_12-8.pdf";

fn page_tables(value: &str) -> Vec<Vec<Vec<String>>> {
    let header = string_rows(&[&["区分", "", "", "", "", "金額", "", "差引"]]);
    (0..4)
        .map(|_| {
            let mut rows = header.clone();
            rows.push(report_row("自己取引計", "売り", value, ""));
            rows
        })
        .collect()
}

fn classified_page(page_index: u16, instrument: Instrument, subtitle: &str) -> ClassifiedPage {
    ClassifiedPage {
        page_index,
        subtitle: PageSubtitle {
            instrument,
            subtitle: subtitle.to_string(),
        },
        sections: page_table_sections(&report_page_text(subtitle)),
    }
}

fn tables(count: usize) -> Vec<Table> {
    (0..count)
        .map(|index| Table::from(vec![vec![format!("table {}", index)]]))
        .collect()
}

#[gtest]
fn test_classify_document() -> Result<()> {
    let reader = FakeTextReader::new().document(
        PDF_NAME,
        &[
            "Trading by Type of Investors\nWeekly report",
            &report_page_text(TEN_YEAR_SUBTITLE),
            &report_page_text("Options on JGB(10-year) Futures"),
            &report_page_text(TONA_SUBTITLE),
        ],
    );

    let document =
        classify_document(&reader, &std::path::Path::new("reports").join(PDF_NAME)).wrap_error()?;

    expect_that!(document.source_name, eq(PDF_NAME));
    expect_that!(document.stem, eq("Dec_2023_Week2_12-4_-_12-8"));
    let indices: Vec<u16> = document.pages.iter().map(|page| page.page_index).collect();
    expect_that!(indices, elements_are![eq(&1), eq(&3)]);
    expect_that!(
        &document.pages[0],
        eq(&classified_page(1, Instrument::Jgb10YearFutures, TEN_YEAR_SUBTITLE))
    );
    expect_eq!(
        document.pages[1].subtitle.instrument,
        Instrument::ThreeMonthTonaFutures
    );
    expect_true!(document.pages[1].sections.contains(TableType::MainSummary));
    Ok(())
}

#[gtest]
fn test_classify_document_unreadable() {
    let reader = FakeTextReader::new();

    expect_that!(
        classify_document(&reader, std::path::Path::new("missing.pdf")),
        err(displays_as(contains_substring("reading text of")))
    );
}

#[gtest]
fn test_combine_pages_sorts_and_labels() {
    let document = combine_pages(
        PDF_NAME,
        vec![
            (
                classified_page(5, Instrument::ThreeMonthTonaFutures, TONA_SUBTITLE),
                tables(3),
            ),
            (
                classified_page(2, Instrument::Jgb10YearFutures, TEN_YEAR_SUBTITLE),
                tables(4),
            ),
        ],
    );

    let indices: Vec<u16> = document.pages.iter().map(|page| page.page_index).collect();
    expect_that!(indices, elements_are![eq(&2), eq(&5)]);

    let first_labels: Vec<TableLabel> = document.pages[0]
        .tables
        .iter()
        .map(|table| table.label)
        .collect();
    expect_that!(
        first_labels,
        elements_are![
            eq(&TableLabel::Typed(TableType::MainSummary)),
            eq(&TableLabel::Typed(TableType::BrokerageBreakdown)),
            eq(&TableLabel::Typed(TableType::InstitutionsBreakdown)),
            eq(&TableLabel::Typed(TableType::FinancialInstitutionsBreakdown)),
        ]
    );
    let second_labels: Vec<TableLabel> = document.pages[1]
        .tables
        .iter()
        .map(|table| table.label)
        .collect();
    expect_that!(
        second_labels,
        elements_are![
            eq(&TableLabel::Fallback { position: 1 }),
            eq(&TableLabel::Fallback { position: 2 }),
            eq(&TableLabel::Fallback { position: 3 }),
        ]
    );
}

#[gtest]
fn test_extract_relevant_tables_indexes_in_page_order() {
    let document = combine_pages(
        PDF_NAME,
        vec![
            (
                classified_page(7, Instrument::ThreeMonthTonaFutures, TONA_SUBTITLE),
                tables(4),
            ),
            (
                classified_page(1, Instrument::Jgb10YearFutures, TEN_YEAR_SUBTITLE),
                tables(4),
            ),
        ],
    );

    let refs = extract_relevant_tables(&document);

    expect_that!(refs, len(eq(8)));
    let indices: Vec<usize> = refs.iter().map(|table| table.index).collect();
    expect_that!(indices, eq(&(0..8).collect::<Vec<usize>>()));
    expect_eq!(refs[0].instrument, Instrument::Jgb10YearFutures);
    expect_that!(refs[0].subtitle, eq(TEN_YEAR_SUBTITLE));
    expect_eq!(refs[4].instrument, Instrument::ThreeMonthTonaFutures);
    expect_eq!(refs[5].label, TableLabel::Typed(TableType::BrokerageBreakdown));
    expect_that!(&refs[6].rows[0][0], eq("table 2"));
}

#[gtest]
fn test_write_and_read_combined_document() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let path = temp_dir.path().join("combined.json");
    let document = combine_pages(
        PDF_NAME,
        vec![(
            classified_page(1, Instrument::Mini20YearJgbFutures, "mini-20-year JGB Futures"),
            tables(4),
        )],
    );

    write_combined_document(&document, &path).wrap_error()?;
    let read_back: CombinedDocument = read_combined_document(&path).wrap_error()?;

    expect_that!(read_back, eq(&document));
    Ok(())
}

#[gtest]
fn test_convert_documents_isolates_failures() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let layout = ArtifactLayout::new(temp_dir.path().join("work"));
    let reader = FakeTextReader::new().document(
        PDF_NAME,
        &[
            &report_page_text(TEN_YEAR_SUBTITLE),
            &report_page_text(TONA_SUBTITLE),
            &report_page_text("mini-20-year JGB Futures"),
            &report_page_text("mini-10-year JGB Futures (Cash-Settled)"),
        ],
    );
    let converter = FakeConverter::new()
        // Completes after the page that follows it.
        .page(
            PDF_NAME,
            0,
            FakePage::Tables {
                tables: page_tables("100"),
                delay: Duration::from_millis(100),
            },
        )
        .page(PDF_NAME, 1, FakePage::tables(page_tables("200")))
        .page(PDF_NAME, 2, FakePage::Fail)
        .page(PDF_NAME, 3, FakePage::Panic);
    let document = classify_document(&reader, &temp_dir.path().join(PDF_NAME)).wrap_error()?;
    let mut events = RecordingEvents::default();

    let combined =
        convert_documents(&[document], &converter, &layout, 2, &mut events).wrap_error()?;

    expect_that!(combined, len(eq(1)));
    let pages: Vec<u16> = combined[0].pages.iter().map(|page| page.page_index).collect();
    expect_that!(pages, elements_are![eq(&0), eq(&1)]);
    expect_that!(&combined[0].pages[0].tables[0].rows[1][5], eq("100"));
    expect_eq!(
        combined[0].pages[1].instrument,
        Instrument::ThreeMonthTonaFutures
    );

    let combined_path = layout.combined_path("Dec_2023_Week2_12-4_-_12-8");
    expect_that!(read_combined_document(&combined_path).wrap_error()?, eq(&combined[0]));
    expect_that!(converter.converted(), len(eq(2)));
    for fragment in converter.converted() {
        expect_false!(fragment.exists());
    }

    expect_that!(
        events.events.first(),
        some(eq(&ConvertEvent::Started { total_pages: 4 }))
    );
    let finished: Vec<(u16, bool)> = events
        .events
        .iter()
        .filter_map(|event| match event {
            ConvertEvent::PageFinished {
                page_index,
                succeeded,
                ..
            } => Some((*page_index, *succeeded)),
            _ => None,
        })
        .collect();
    expect_that!(
        finished,
        unordered_elements_are![
            eq(&(0, true)),
            eq(&(1, true)),
            eq(&(2, false)),
            eq(&(3, false)),
        ]
    );
    expect_that!(
        events.events.last(),
        some(eq(&ConvertEvent::DocumentCombined {
            source_name: PDF_NAME.to_string(),
            path: combined_path.clone(),
            pages: 2,
        }))
    );
    Ok(())
}

#[test_log::test]
fn test_convert_documents_skips_document_without_converted_pages() -> anyhow::Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let layout = ArtifactLayout::new(temp_dir.path());
    let reader = FakeTextReader::new()
        .document("failing.pdf", &[&report_page_text(TEN_YEAR_SUBTITLE)])
        .document("working.pdf", &[&report_page_text(TONA_SUBTITLE)]);
    let converter = FakeConverter::new()
        .page("failing.pdf", 0, FakePage::Fail)
        .page("working.pdf", 0, FakePage::tables(page_tables("5")));
    let documents = vec![
        classify_document(&reader, &temp_dir.path().join("failing.pdf"))?,
        classify_document(&reader, &temp_dir.path().join("working.pdf"))?,
    ];
    let mut events = RecordingEvents::default();

    let combined = convert_documents(&documents, &converter, &layout, 6, &mut events)?;

    assert_that!(&combined, len(eq(1)));
    assert_that!(&combined[0].source_name, eq("working.pdf"));
    assert_that!(layout.combined_path("failing").exists(), eq(false));
    assert_that!(layout.combined_path("working").exists(), eq(true));
    assert_that!(
        &events.events,
        contains(eq(&ConvertEvent::DocumentSkipped {
            source_name: "failing.pdf".to_string()
        }))
    );
    Ok(())
}

#[gtest]
fn test_convert_documents_keeps_same_named_reports_apart() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let layout = ArtifactLayout::new(temp_dir.path().join("work"));
    let reader = FakeTextReader::new().document(PDF_NAME, &[&report_page_text(TEN_YEAR_SUBTITLE)]);
    let converter = FakeConverter::new().page(PDF_NAME, 0, FakePage::tables(page_tables("100")));
    let documents = vec![
        classify_document(&reader, &temp_dir.path().join("2023").join(PDF_NAME)).wrap_error()?,
        classify_document(&reader, &temp_dir.path().join("backup").join(PDF_NAME))
            .wrap_error()?,
    ];
    let mut events = RecordingEvents::default();

    let combined =
        convert_documents(&documents, &converter, &layout, 2, &mut events).wrap_error()?;

    expect_that!(combined, len(eq(2)));
    let fragments = converter.converted();
    expect_that!(fragments, len(eq(2)));
    expect_that!(&fragments[0], not(eq(&fragments[1])));
    let first_path = layout.combined_path("Dec_2023_Week2_12-4_-_12-8");
    let second_path = layout.combined_path("Dec_2023_Week2_12-4_-_12-8_2");
    expect_true!(first_path.is_file());
    expect_true!(second_path.is_file());
    let combined_paths: Vec<std::path::PathBuf> = events
        .events
        .iter()
        .filter_map(|event| match event {
            ConvertEvent::DocumentCombined { path, .. } => Some(path.clone()),
            _ => None,
        })
        .collect();
    expect_that!(combined_paths, elements_are![eq(&first_path), eq(&second_path)]);
    Ok(())
}

#[test_log::test]
fn test_convert_documents_skips_document_that_cannot_be_saved() -> anyhow::Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let layout = ArtifactLayout::new(temp_dir.path());
    // A directory in the way of the combined document.
    std::fs::create_dir_all(layout.combined_path("blocked"))?;
    let reader = FakeTextReader::new()
        .document("blocked.pdf", &[&report_page_text(TEN_YEAR_SUBTITLE)])
        .document("working.pdf", &[&report_page_text(TONA_SUBTITLE)]);
    let converter = FakeConverter::new()
        .page("blocked.pdf", 0, FakePage::tables(page_tables("1")))
        .page("working.pdf", 0, FakePage::tables(page_tables("2")));
    let documents = vec![
        classify_document(&reader, &temp_dir.path().join("blocked.pdf"))?,
        classify_document(&reader, &temp_dir.path().join("working.pdf"))?,
    ];
    let mut events = RecordingEvents::default();

    let combined = convert_documents(&documents, &converter, &layout, 2, &mut events)?;

    assert_that!(&combined, len(eq(1)));
    assert_that!(&combined[0].source_name, eq("working.pdf"));
    assert_that!(layout.combined_path("working").is_file(), eq(true));
    assert_that!(
        &events.events,
        contains(eq(&ConvertEvent::DocumentSkipped {
            source_name: "blocked.pdf".to_string()
        }))
    );
    Ok(())
}

#[gtest]
fn test_convert_documents_without_pages() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let layout = ArtifactLayout::new(temp_dir.path());
    let reader = FakeTextReader::new().document("cover.pdf", &["Contents"]);
    let document = classify_document(&reader, &temp_dir.path().join("cover.pdf")).wrap_error()?;

    let combined =
        convert_documents(&[document], &FakeConverter::new(), &layout, 6, &mut NoEvents)
            .wrap_error()?;

    expect_that!(combined, is_empty());
    Ok(())
}
