use wealth_core::simulation::{
    simulate_amortization, simulate_growth, DEFAULT_AMORTIZATION_MONTHS, DEFAULT_GROWTH_MONTHS,
    DEFAULT_RETURN_PERCENT,
};

#[test]
fn amortization_schedule_pays_off_known_loan() {
    let rows = simulate_amortization(10000.0, 12.0, 500.0, DEFAULT_AMORTIZATION_MONTHS);

    assert_eq!(rows[0].interest, 100.0);
    assert_eq!(rows[0].principal, 400.0);
    assert_eq!(rows[0].balance, 9600.0);

    // Interest accrues on the declining balance.
    assert_eq!(rows[1].interest, 96.0);
    assert_eq!(rows[1].balance, 9196.0);

    let last = rows.last().unwrap();
    assert!(last.balance <= 0.01);
    assert!(last.payment < 500.0, "final payment is capped, not a full 500");
}

#[test]
fn amortization_row_arithmetic_is_internally_consistent() {
    let rows = simulate_amortization(25000.0, 7.5, 650.0, DEFAULT_AMORTIZATION_MONTHS);
    let mut previous = 25000.0;
    for row in &rows {
        assert!((row.payment - (row.principal + row.interest)).abs() < 0.011);
        assert!((previous - row.principal - row.balance).abs() < 0.011);
        previous = row.balance;
    }
}

#[test]
fn growth_projection_compounds_monthly() {
    let rows = simulate_growth(10000.0, 0.0, DEFAULT_RETURN_PERCENT, 12);
    assert_eq!(rows.len(), 12);
    // ~7% annual compounded monthly on a static balance.
    let final_balance = rows.last().unwrap().balance;
    assert!(final_balance > 10700.0 && final_balance < 10730.0);
}

#[test]
fn growth_projection_has_fixed_horizon_even_at_zero() {
    let rows = simulate_growth(0.0, 0.0, DEFAULT_RETURN_PERCENT, DEFAULT_GROWTH_MONTHS);
    assert_eq!(rows.len(), DEFAULT_GROWTH_MONTHS);
    assert!(rows.iter().all(|row| row.balance == 0.0));
}
