use loan_intake::workflows::intake::domain::{
    AdmissionKyc, CanonicalRecord, MobileVerification, UserId,
};
use loan_intake::workflows::lenders::{
    CatalogImportError, LenderCatalog, LenderScope, MatchConfig, RecommendationEngine,
    StaticLenderCatalog,
};

fn indian_applicant() -> CanonicalRecord {
    let mut record = CanonicalRecord::new(UserId("applicant-9".to_string()));
    record.mobile = Some(MobileVerification {
        number: Some("9898989898".to_string()),
        dial_code: Some("+91".to_string()),
        country_short_name: Some("IN".to_string()),
        verified: true,
    });
    record.admission_kyc = Some(AdmissionKyc {
        has_offer_letter: Some(true),
        admission_fees: Some("$20,000 USD per year".to_string()),
        ..AdmissionKyc::default()
    });
    record
}

#[test]
fn importer_keeps_row_order_and_blank_fields() {
    let csv = "Lender Name,Base Country,Loan Currency,Interest Rate,Website\n\
State Bank of India,India,INR,9.15%,https://sbi.co.in\n\
Avanse Financial Services,,INR,11.5%,\n\
Prodigy Finance,,USD,12%,https://prodigyfinance.com\n";

    let catalog = StaticLenderCatalog::from_csv_reader(csv.as_bytes()).expect("import succeeds");
    let lenders = catalog.list();
    assert_eq!(lenders.len(), 3);
    assert_eq!(lenders[0].name, "State Bank of India");
    assert_eq!(lenders[1].base_country, None);
    assert_eq!(lenders[1].website, None);
    assert_eq!(lenders[2].loan_currency.as_deref(), Some("USD"));
}

#[test]
fn importer_skips_nameless_rows_and_trims_padding() {
    let csv = "Lender Name,Base Country,Loan Currency,Interest Rate,Website\n\
 , India ,INR,9%,\n\
 Axis Bank , India , INR , 10.5% ,\n";

    let catalog =
        StaticLenderCatalog::from_csv_reader(csv.as_bytes()).expect("named row imports");
    assert_eq!(catalog.len(), 1);
    let lenders = catalog.list();
    assert_eq!(lenders[0].name, "Axis Bank");
    assert_eq!(lenders[0].base_country.as_deref(), Some("India"));
    assert_eq!(lenders[0].interest_rate.as_deref(), Some("10.5%"));
}

#[test]
fn a_catalog_with_no_usable_rows_is_an_error() {
    let csv = "Lender Name,Base Country,Loan Currency,Interest Rate,Website\n\
,,INR,,\n";

    let err =
        StaticLenderCatalog::from_csv_reader(csv.as_bytes()).expect_err("nameless rows only");
    assert!(matches!(err, CatalogImportError::Empty));
}

#[test]
fn the_shipped_catalog_imports_in_full() {
    let data = include_bytes!("../lender_catalog.csv");
    let catalog =
        StaticLenderCatalog::from_csv_reader(&data[..]).expect("shipped catalog imports");
    assert_eq!(catalog.len(), 12);
    assert!(catalog
        .list()
        .iter()
        .all(|lender| !lender.name.trim().is_empty()));
}

#[test]
fn recommendations_bucket_the_shipped_catalog_for_an_indian_applicant() {
    let data = include_bytes!("../lender_catalog.csv");
    let catalog =
        StaticLenderCatalog::from_csv_reader(&data[..]).expect("shipped catalog imports");
    let engine = RecommendationEngine::new(MatchConfig::default());

    let recommendations = engine.recommend(&indian_applicant(), &catalog.list());
    assert_eq!(recommendations.home_country.as_deref(), Some("india"));
    assert_eq!(recommendations.estimated_loan_amount, "16000 - 17000 USD");
    assert_eq!(recommendations.domestic.len(), 7);
    assert_eq!(recommendations.foreign.len(), 5);
    assert!(recommendations
        .domestic
        .iter()
        .all(|entry| entry.scope == LenderScope::Domestic));
    assert_eq!(recommendations.domestic[0].lender.name, "State Bank of India");
    assert_eq!(recommendations.foreign[0].lender.name, "Prodigy Finance");
}

#[test]
fn an_applicant_without_fees_gets_no_estimate() {
    let engine = RecommendationEngine::new(MatchConfig::default());
    let record = CanonicalRecord::new(UserId("applicant-10".to_string()));

    let recommendations = engine.recommend(&record, &[]);
    assert_eq!(recommendations.home_country, None);
    assert_eq!(recommendations.estimated_loan_amount, "N/A");
    assert!(recommendations.domestic.is_empty());
    assert!(recommendations.foreign.is_empty());
}
