use gsheet_core::{LedgerEntry, MemoryTransport, Record, StoreError, Template};
use gsheet_mapping::FieldKey;
use gsheet_store::SheetRecordStore;
use std::sync::Arc;

fn ledger_transport() -> MemoryTransport {
    MemoryTransport::new()
        .with_sheet(
            "Gelirler",
            vec![
                vec!["Tarih", "Açıklama", "Tutar", "Tür", "Kategori"],
                vec!["2024-01-05", "Hakediş 1", "100000", "Gelir", "Proje"],
                vec!["2024-01-09", "Avans"],
                vec!["2024-02-01", "Kira", "15000", "Gider", "Ofis"],
                vec!["2024-02-03", "Çimento", "42000", "Gider", "Malzeme"],
            ],
        )
        .with_sheet(
            "Proje Takip",
            vec![
                vec![
                    "Proje Adı",
                    "Proje Kodu",
                    "Proje Türü",
                    "Lokasyon",
                    "İşveren",
                    "Yüklenici",
                    "Müşavir",
                ],
                vec![
                    "GUEST HOUSE",
                    "GH",
                    "KAMU BİNASI",
                    "BAĞDAT",
                    "IRAK HÜKUNETİ",
                    "GÖRKEM İNŞAAT",
                    "Firma1",
                ],
            ],
        )
}

fn setup() -> (Arc<MemoryTransport>, SheetRecordStore) {
    let transport = Arc::new(ledger_transport());
    let store = SheetRecordStore::new(transport.clone());
    (transport, store)
}

fn entry(date: &str, description: &str, amount: &str) -> LedgerEntry {
    LedgerEntry {
        date: date.into(),
        description: description.into(),
        amount: amount.into(),
        kind: "Gider".into(),
        category: "Malzeme".into(),
    }
}

// ===== Listing =====

#[tokio::test]
async fn test_list_sheets_with_headers() {
    let (_, store) = setup();
    let sheets = store.list_sheets().await.unwrap();

    assert_eq!(sheets.len(), 2);
    assert_eq!(sheets[0].title, "Gelirler");
    assert_eq!(sheets[0].headers.len(), 5);
    assert_eq!(sheets[1].title, "Proje Takip");
    assert_eq!(sheets[1].index, 1);
    assert_eq!(sheets[1].headers[4], "İşveren");
    assert_ne!(sheets[0].sheet_id, sheets[1].sheet_id);
}

#[tokio::test]
async fn test_list_sheets_auth_required() {
    let (transport, store) = setup();
    transport.set_authorized(false);

    assert!(store.list_sheets().await.unwrap_err().is_auth_required());
    assert!(store.list_sheets_or_empty().await.is_empty());
}

#[tokio::test]
async fn test_list_sheets_blank_tab() {
    let transport = Arc::new(MemoryTransport::new().with_sheet("Bos", vec![]));
    let store = SheetRecordStore::new(transport);
    let sheets = store.list_sheets().await.unwrap();
    assert_eq!(sheets.len(), 1);
    assert!(sheets[0].headers.is_empty());
}

// ===== Reading =====

#[tokio::test]
async fn test_get_sheet_data() {
    let (_, store) = setup();
    let data = store.get_sheet_data("Gelirler").await.unwrap();

    assert_eq!(data.headers[0], "Tarih");
    assert_eq!(data.records.len(), 4);
    for (i, record) in data.records.iter().enumerate() {
        assert_eq!(record.row_index, i);
        assert_eq!(record.len(), data.headers.len());
    }
    assert_eq!(data.records[1].get("Açıklama"), Some("Avans"));
    assert_eq!(data.records[1].get("Tutar"), Some(""));
    assert_eq!(data.records[1].get("Kategori"), Some(""));
}

#[tokio::test]
async fn test_get_sheet_data_not_found() {
    let (_, store) = setup();
    let err = store.get_sheet_data("Giderler").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_sheet_view_maps_fields() {
    let (_, store) = setup();
    let view = store.get_sheet_view("Proje Takip").await.unwrap();

    assert_eq!(view.field(0, FieldKey::Isveren), Some("IRAK HÜKUNETİ"));
    assert_eq!(view.field(0, FieldKey::ProjeAdi), Some("GUEST HOUSE"));
    assert_eq!(view.field(1, FieldKey::ProjeAdi), None);

    let fields = view.fields(0).unwrap();
    assert_eq!(fields.len(), 7);
    assert_eq!(fields[&FieldKey::Musavir], "Firma1");
}

// ===== Appending =====

#[tokio::test]
async fn test_append_round_trip() {
    let (transport, store) = setup();
    let appended = entry("2024-03-01", "Demir", "87500");

    store.append_record("Gelirler", &appended).await.unwrap();

    let data = store.get_sheet_data("Gelirler").await.unwrap();
    let last = data.records.last().unwrap();
    assert_eq!(last.row_index, 4);
    assert_eq!(last.to_row(), appended.to_row());
    assert_eq!(transport.write_log().await, vec!["'Gelirler'!A:E"]);
}

#[tokio::test]
async fn test_append_uses_fixed_layout_on_other_sheets() {
    let (_, store) = setup();
    store
        .append_record("Proje Takip", &entry("2024-03-01", "Demir", "1"))
        .await
        .unwrap();

    let data = store.get_sheet_data("Proje Takip").await.unwrap();
    let last = data.records.last().unwrap();
    assert_eq!(last.get("Proje Adı"), Some("2024-03-01"));
    assert_eq!(last.get("Müşavir"), Some(""));
}

#[tokio::test]
async fn test_append_to_missing_sheet() {
    let (_, store) = setup();
    let err = store
        .append_record("Yok", &entry("2024-03-01", "x", "1"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

// ===== Updating =====

#[tokio::test]
async fn test_update_addresses_row_offset() {
    let (transport, store) = setup();
    let record = Record::from_pairs(
        3,
        [
            ("Tarih", "2024-02-04"),
            ("Açıklama", "Çimento (düzeltme)"),
            ("Tutar", "41000"),
            ("Tür", "Gider"),
            ("Kategori", "Malzeme"),
        ],
    );

    store.update_record("Gelirler", 3, &record).await.unwrap();

    assert_eq!(transport.write_log().await, vec!["'Gelirler'!A5:E5"]);
    let data = store.get_sheet_data("Gelirler").await.unwrap();
    assert_eq!(data.records[3], record);
    assert_eq!(data.records[2].get("Açıklama"), Some("Kira"));
}

#[tokio::test]
async fn test_partial_update_leaves_trailing_columns() {
    let (_, store) = setup();
    let record = Record::from_pairs(0, [("Tarih", "2024-01-06"), ("Açıklama", "Hakediş 1b")]);

    store.update_record("Gelirler", 0, &record).await.unwrap();

    let data = store.get_sheet_data("Gelirler").await.unwrap();
    assert_eq!(data.records[0].get("Tarih"), Some("2024-01-06"));
    assert_eq!(data.records[0].get("Açıklama"), Some("Hakediş 1b"));
    assert_eq!(data.records[0].get("Tutar"), Some("100000"));
}

#[tokio::test]
async fn test_update_places_values_by_header() {
    let (transport, store) = setup();
    let record = Record::from_pairs(0, [("Tutar", "777"), ("Tarih", "2025-01-01")]);

    store.update_record("Gelirler", 0, &record).await.unwrap();

    let data = store.get_sheet_data("Gelirler").await.unwrap();
    assert_eq!(data.records[0].get("Tarih"), Some("2025-01-01"));
    assert_eq!(data.records[0].get("Açıklama"), Some("Hakediş 1"));
    assert_eq!(data.records[0].get("Tutar"), Some("777"));
    assert_eq!(data.records[0].get("Kategori"), Some("Proje"));
    assert_eq!(transport.write_log().await, vec!["'Gelirler'!A2:C2"]);
}

#[tokio::test]
async fn test_update_of_a_later_column_keeps_earlier_cells() {
    let (transport, store) = setup();
    let record = Record::from_pairs(0, [("Kategori", "Ofis")]);

    store.update_record("Gelirler", 0, &record).await.unwrap();

    assert_eq!(
        transport.rows("Gelirler").await.unwrap()[1],
        vec!["2024-01-05", "Hakediş 1", "100000", "Gelir", "Ofis"]
    );
    assert_eq!(transport.write_log().await, vec!["'Gelirler'!A2:E2"]);
}

#[tokio::test]
async fn test_update_fills_short_rows() {
    let (transport, store) = setup();
    let record = Record::from_pairs(1, [("Tür", "Gelir")]);

    store.update_record("Gelirler", 1, &record).await.unwrap();

    assert_eq!(
        transport.rows("Gelirler").await.unwrap()[2],
        vec!["2024-01-09", "Avans", "", "Gelir"]
    );
}

#[tokio::test]
async fn test_update_quotes_sheet_names() {
    let (transport, store) = setup();
    let record = Record::from_pairs(0, [("Proje Adı", "GUEST HOUSE 2")]);

    store.update_record("Proje Takip", 0, &record).await.unwrap();

    assert_eq!(transport.write_log().await, vec!["'Proje Takip'!A2:A2"]);
}

#[tokio::test]
async fn test_update_rejects_unaddressable_records() {
    let (transport, store) = setup();

    let empty = Record::new(0);
    assert!(matches!(
        store.update_record("Gelirler", 0, &empty).await,
        Err(StoreError::InvalidInput(_))
    ));

    let unknown = Record::from_pairs(0, [("Tarih", "2025-01-01"), ("Fiyat", "1")]);
    let err = store.update_record("Gelirler", 0, &unknown).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput(ref msg) if msg.contains("Fiyat")));

    assert!(matches!(
        store.update_record("Yok", 0, &Record::from_pairs(0, [("Tarih", "x")])).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(transport.write_log().await.is_empty());
}

#[tokio::test]
async fn test_update_beyond_column_z() {
    let names: Vec<String> = (0..27).map(|i| format!("K{i}")).collect();
    let headers = names.iter().map(String::as_str).collect();
    let transport = Arc::new(MemoryTransport::new().with_sheet("Genis", vec![headers]));
    let store = SheetRecordStore::new(transport.clone());

    let last = Record::from_pairs(0, [("K26", "x")]);
    assert!(matches!(
        store.update_record("Genis", 0, &last).await,
        Err(StoreError::ColumnOutOfRange { index: 26 })
    ));

    let first = Record::from_pairs(0, [("K25", "z")]);
    store.update_record("Genis", 0, &first).await.unwrap();
    assert_eq!(transport.write_log().await, vec!["'Genis'!A2:Z2"]);
}

#[tokio::test]
async fn test_update_failure_propagates() {
    let (transport, store) = setup();
    transport.fail_next_writes(1).await;
    let record = Record::from_pairs(0, [("Tarih", "x")]);

    let err = store.update_record("Gelirler", 0, &record).await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));
}

// ===== Creating and deleting =====

#[tokio::test]
async fn test_create_sheet_writes_headers() {
    let (transport, store) = setup();
    let headers: Vec<String> = vec!["Ad".into(), "Soyad".into()];

    let info = store.create_sheet("Personel", &headers).await.unwrap();

    assert_eq!(info.title, "Personel");
    assert_eq!(info.index, 2);
    assert_eq!(info.headers, headers);
    assert_eq!(
        transport.rows("Personel").await.unwrap(),
        vec![vec!["Ad".to_string(), "Soyad".to_string()]]
    );
    assert_eq!(transport.write_log().await, vec!["'Personel'!A1"]);
}

#[tokio::test]
async fn test_create_sheet_without_headers() {
    let (transport, store) = setup();
    let info = store.create_sheet("Notlar", &[]).await.unwrap();

    assert!(info.headers.is_empty());
    assert!(transport.rows("Notlar").await.unwrap().is_empty());
    assert!(transport.write_log().await.is_empty());
}

#[tokio::test]
async fn test_create_sheet_from_template() {
    let (_, store) = setup();
    let info = store
        .create_sheet_from_template("Yeni Proje", Template::ProjectTracking)
        .await
        .unwrap();
    assert_eq!(info.headers, Template::ProjectTracking.header_row());

    let data = store.get_sheet_data("Yeni Proje").await.unwrap();
    assert_eq!(data.headers, Template::ProjectTracking.header_row());
    assert!(data.records.is_empty());
}

#[tokio::test]
async fn test_create_sheet_rejects_blank_name() {
    let (_, store) = setup();
    assert!(matches!(
        store.create_sheet("  ", &[]).await,
        Err(StoreError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_delete_sheet_by_id() {
    let (_, store) = setup();
    let sheets = store.list_sheets().await.unwrap();
    let target = sheets.iter().find(|s| s.title == "Proje Takip").unwrap();

    store.delete_sheet(target.sheet_id).await.unwrap();

    let remaining = store.list_sheets().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].title, "Gelirler");
    assert!(store.delete_sheet(target.sheet_id).await.unwrap_err().is_not_found());
}
