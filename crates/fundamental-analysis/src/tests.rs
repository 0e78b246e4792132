#[cfg(test)]
mod fundamental_tests {
    use crate::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use serde_json::{json, Value};

    fn statements(value: Value) -> FinancialStatements {
        FinancialStatements::from_json(&value).unwrap()
    }

    fn healthy_statements() -> FinancialStatements {
        statements(json!({
            "income_annual": {
                "Total Revenue": [1000.0, 900.0, 850.0, 800.0, 760.0, 700.0],
                "Cost Of Revenue": [550.0, 540.0],
                "Gross Profit": [450.0, 360.0],
                "Operating Income": [200.0, 150.0],
                "EBITDA": [260.0, 200.0],
                "EBIT": [180.0, 140.0],
                "Net Income": [120.0, 80.0, 70.0, 60.0]
            },
            "balance_annual": {
                "Total Assets": [1000.0, 1000.0],
                "Current Assets": [500.0, 400.0],
                "Current Liabilities": [250.0, 250.0],
                "Retained Earnings": [300.0, 250.0],
                "Total Liabilities Net Minority Interest": [400.0, 450.0],
                "Stockholders Equity": [600.0, 550.0],
                "Long Term Debt": [200.0, 300.0],
                "Inventory": [100.0, 120.0],
                "Accounts Receivable": [150.0, 130.0],
                "Accounts Payable": [80.0, 60.0]
            },
            "cash_flow_annual": {
                "Operating Cash Flow": [150.0, 100.0, 95.0, 90.0],
                "Capital Expenditure": [-50.0, -40.0, -35.0, -30.0]
            }
        }))
    }

    fn healthy_profile() -> TickerProfile {
        TickerProfile::from_json(&json!({
            "symbol": "ACME",
            "longName": "Acme Corporation",
            "sector": "Industrials",
            "marketCap": 2000.0,
            "sharesOutstanding": 100.0,
            "returnOnEquity": 0.21
        }))
        .unwrap()
    }

    #[test]
    fn test_growth_rates() {
        let (profile, statements, config) = (healthy_profile(), healthy_statements(), AnalysisConfig::default());
        let growth = FundamentalAnalyzer::new(&profile, &statements, None, &config).calculate_growth_rates();

        assert_relative_eq!(growth.revenue.one_year.unwrap(), 100.0 / 9.0, epsilon = 1e-9);
        assert_relative_eq!(
            growth.revenue.three_year_cagr.unwrap(),
            ((1000.0f64 / 800.0).powf(1.0 / 3.0) - 1.0) * 100.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            growth.revenue.five_year_cagr.unwrap(),
            ((1000.0f64 / 700.0).powf(0.2) - 1.0) * 100.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(growth.earnings.one_year.unwrap(), 50.0, epsilon = 1e-9);
        assert!(growth.earnings.five_year_cagr.is_none());

        // FCF = OCF + CapEx: 100 now, 60 a year ago and three years ago.
        assert_eq!(growth.fcf.current, Some(100.0));
        assert_relative_eq!(growth.fcf.one_year.unwrap(), 200.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(
            growth.fcf.three_year_cagr.unwrap(),
            ((100.0f64 / 60.0).powf(1.0 / 3.0) - 1.0) * 100.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_fcf_metrics() {
        let (profile, statements, config) = (healthy_profile(), healthy_statements(), AnalysisConfig::default());
        let fcf = FundamentalAnalyzer::new(&profile, &statements, None, &config)
            .calculate_fcf_metrics()
            .unwrap();

        assert_eq!(fcf.fcf, 100.0);
        assert_relative_eq!(fcf.fcf_yield.unwrap(), 5.0, epsilon = 1e-12);
        assert_relative_eq!(fcf.fcf_per_share.unwrap(), 1.0);
        assert_relative_eq!(fcf.fcf_margin.unwrap(), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_market_cap_from_last_close() {
        let profile = TickerProfile::new().with_number("sharesOutstanding", 100.0);
        let statements = healthy_statements();
        let config = AnalysisConfig::default();
        let prices = PriceSeries::from_closes(vec![
            (NaiveDate::from_ymd_opt(2024, 12, 30).unwrap(), 19.0),
            (NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(), 20.0),
        ])
        .unwrap();

        let analyzer = FundamentalAnalyzer::new(&profile, &statements, Some(&prices), &config);
        assert_eq!(analyzer.market_cap(), Some(2000.0));
        assert_relative_eq!(analyzer.calculate_fcf_metrics().unwrap().fcf_yield.unwrap(), 5.0, epsilon = 1e-12);

        let without_prices = FundamentalAnalyzer::new(&profile, &statements, None, &config);
        assert_eq!(without_prices.market_cap(), None);
        assert!(without_prices.calculate_altman_z_score().is_none());
    }

    #[test]
    fn test_margins_and_trend() {
        let (profile, statements, config) = (healthy_profile(), healthy_statements(), AnalysisConfig::default());
        let margins = FundamentalAnalyzer::new(&profile, &statements, None, &config).calculate_margins();

        assert_relative_eq!(margins.current.gross_margin.unwrap(), 45.0, epsilon = 1e-9);
        assert_relative_eq!(margins.current.operating_margin.unwrap(), 20.0, epsilon = 1e-9);
        assert_relative_eq!(margins.current.ebitda_margin.unwrap(), 26.0, epsilon = 1e-9);
        assert_relative_eq!(margins.current.net_margin.unwrap(), 12.0, epsilon = 1e-9);

        assert_relative_eq!(margins.trend.one_year_ago.unwrap(), 80.0 / 9.0, epsilon = 1e-9);
        assert_relative_eq!(margins.trend.two_years_ago.unwrap(), 7000.0 / 850.0, epsilon = 1e-9);
        assert_eq!(margins.trend.direction, Some(MarginDirection::Improving));
    }

    #[test]
    fn test_margins_fall_back_to_profile() {
        let profile = TickerProfile::new()
            .with_number("profitMargins", 0.25)
            .with_number("operatingMargins", 0.3);
        let statements = FinancialStatements::default();
        let config = AnalysisConfig::default();

        let margins = FundamentalAnalyzer::new(&profile, &statements, None, &config).calculate_margins();
        assert_relative_eq!(margins.current.net_margin.unwrap(), 25.0, epsilon = 1e-12);
        assert_relative_eq!(margins.current.operating_margin.unwrap(), 30.0, epsilon = 1e-12);
        assert!(margins.current.gross_margin.is_none());
        assert!(margins.trend.direction.is_none());
    }

    #[test]
    fn test_efficiency_ratios() {
        let (profile, statements, config) = (healthy_profile(), healthy_statements(), AnalysisConfig::default());
        let eff = FundamentalAnalyzer::new(&profile, &statements, None, &config).calculate_efficiency_ratios();

        let inventory_turnover = 550.0 / 110.0;
        let receivables_turnover = 1000.0 / 140.0;
        let payables_turnover = 550.0 / 70.0;

        assert_relative_eq!(eff.asset_turnover.unwrap(), 1.0);
        assert_relative_eq!(eff.inventory_turnover.unwrap(), inventory_turnover, epsilon = 1e-12);
        assert_relative_eq!(eff.days_inventory_outstanding.unwrap(), 73.0, epsilon = 1e-9);
        assert_relative_eq!(eff.receivables_turnover.unwrap(), receivables_turnover, epsilon = 1e-12);
        assert_relative_eq!(eff.payables_turnover.unwrap(), payables_turnover, epsilon = 1e-12);

        let ccc = 365.0 / inventory_turnover + 365.0 / receivables_turnover - 365.0 / payables_turnover;
        assert_relative_eq!(eff.cash_conversion_cycle.unwrap(), ccc, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_denominators_are_omitted() {
        let statements = statements(json!({
            "income_annual": {
                "Total Revenue": [1000.0],
                "Cost Of Revenue": [600.0]
            },
            "balance_annual": {
                "Total Assets": [0.0],
                "Inventory": [0.0, 0.0],
                "Accounts Receivable": [100.0]
            }
        }));
        let profile = TickerProfile::new();
        let config = AnalysisConfig::default();

        let eff = FundamentalAnalyzer::new(&profile, &statements, None, &config).calculate_efficiency_ratios();
        assert!(eff.asset_turnover.is_none());
        assert!(eff.inventory_turnover.is_none());
        // Receivables need both periods for the average.
        assert!(eff.receivables_turnover.is_none());
        assert!(eff.cash_conversion_cycle.is_none());
        assert!(eff.is_empty());
        assert_eq!(serde_json::to_value(&eff).unwrap(), json!({}));
    }

    #[test]
    fn test_dupont_decomposition() {
        let (profile, statements, config) = (healthy_profile(), healthy_statements(), AnalysisConfig::default());
        let dupont = FundamentalAnalyzer::new(&profile, &statements, None, &config).calculate_dupont_analysis();

        assert_relative_eq!(dupont.net_margin.unwrap(), 12.0, epsilon = 1e-9);
        assert_relative_eq!(dupont.asset_turnover.unwrap(), 1.0);
        assert_relative_eq!(dupont.equity_multiplier.unwrap(), 1000.0 / 600.0);
        assert_relative_eq!(dupont.roe_calculated.unwrap(), 20.0, epsilon = 1e-9);
        assert_relative_eq!(dupont.roe_reported.unwrap(), 21.0, epsilon = 1e-9);
    }

    fn altman_inputs() -> (TickerProfile, Value) {
        let profile = TickerProfile::new().with_number("marketCap", 500.0);
        let tables = json!({
            "balance_annual": {
                "Current Assets": [300.0],
                "Current Liabilities": [200.0],
                "Total Assets": [1000.0],
                "Retained Earnings": [200.0],
                "Total Liabilities Net Minority Interest": [400.0]
            },
            "income_annual": {
                "EBIT": [80.0],
                "Total Revenue": [900.0]
            }
        });
        (profile, tables)
    }

    #[test]
    fn test_altman_hand_computed() {
        let (profile, tables) = altman_inputs();
        let statements = statements(tables);
        let config = AnalysisConfig::default();

        let z = FundamentalAnalyzer::new(&profile, &statements, None, &config)
            .calculate_altman_z_score()
            .unwrap();
        // 1.2*0.1 + 1.4*0.2 + 3.3*0.08 + 0.6*0.5 + 1.0*0.9
        assert_relative_eq!(z.score, 1.864, epsilon = 1e-12);
        assert_eq!(z.zone, AltmanZone::Grey);
        assert_relative_eq!(z.components.x4, 0.5);
    }

    #[test]
    fn test_altman_requires_every_input() {
        let (profile, tables) = altman_inputs();
        let config = AnalysisConfig::default();

        for (table, row) in [
            ("balance_annual", "Current Assets"),
            ("balance_annual", "Current Liabilities"),
            ("balance_annual", "Total Assets"),
            ("balance_annual", "Retained Earnings"),
            ("balance_annual", "Total Liabilities Net Minority Interest"),
            ("income_annual", "EBIT"),
            ("income_annual", "Total Revenue"),
        ] {
            let mut starved = tables.clone();
            starved[table].as_object_mut().unwrap().remove(row);
            let statements = statements(starved);
            let z = FundamentalAnalyzer::new(&profile, &statements, None, &config).calculate_altman_z_score();
            assert!(z.is_none(), "score produced without {row}");
        }

        let statements = statements(tables);
        let no_market_cap = TickerProfile::new();
        assert!(FundamentalAnalyzer::new(&no_market_cap, &statements, None, &config)
            .calculate_altman_z_score()
            .is_none());
    }

    #[test]
    fn test_altman_zone_bands() {
        let (profile, statements, config) = (healthy_profile(), healthy_statements(), AnalysisConfig::default());
        let z = FundamentalAnalyzer::new(&profile, &statements, None, &config)
            .calculate_altman_z_score()
            .unwrap();
        // x4 uses market cap over total assets: 2000 / 1000.
        assert_relative_eq!(z.score, 0.3 + 0.42 + 0.594 + 1.2 + 1.0, epsilon = 1e-12);
        assert_eq!(z.zone, AltmanZone::Safe);

        assert_eq!(AltmanZone::classify(2.99, 2.99, 1.81), AltmanZone::Grey);
        assert_eq!(AltmanZone::classify(1.81, 2.99, 1.81), AltmanZone::Distress);
    }

    #[test]
    fn test_piotroski_improving_company() {
        let (profile, statements, config) = (healthy_profile(), healthy_statements(), AnalysisConfig::default());
        let f = FundamentalAnalyzer::new(&profile, &statements, None, &config)
            .calculate_piotroski_f_score()
            .unwrap();

        assert!(f.score >= 7);
        assert_eq!(f.score, 8);
        assert_eq!(f.max_score, 8);
        assert_eq!(f.strength, FScoreStrength::Strong);
        assert_eq!(f.criteria.no_new_shares, None);
        assert_eq!(f.criteria.long_term_debt_decreased, Some(true));
    }

    #[test]
    fn test_piotroski_strength_follows_config() {
        let profile = healthy_profile();
        let statements = healthy_statements();
        let config = AnalysisConfig {
            min_f_score_strong: 9,
            ..AnalysisConfig::default()
        };
        let f = FundamentalAnalyzer::new(&profile, &statements, None, &config)
            .calculate_piotroski_f_score()
            .unwrap();
        assert_eq!(f.strength, FScoreStrength::Average);
    }

    #[test]
    fn test_piotroski_partial_and_absent_tables() {
        let profile = TickerProfile::new();
        let config = AnalysisConfig::default();

        let none = FinancialStatements::default();
        assert!(FundamentalAnalyzer::new(&profile, &none, None, &config)
            .calculate_piotroski_f_score()
            .is_none());

        let income_only = statements(json!({
            "income_annual": {
                "Net Income": [50.0, 40.0],
                "Total Revenue": [500.0, 480.0],
                "Gross Profit": [200.0, 180.0]
            }
        }));
        let f = FundamentalAnalyzer::new(&profile, &income_only, None, &config)
            .calculate_piotroski_f_score()
            .unwrap();
        assert_eq!(f.criteria.positive_net_income, Some(true));
        assert_eq!(f.criteria.gross_margin_increased, Some(true));
        assert_eq!(f.criteria.roa_increased, None);
        assert_eq!(f.criteria.positive_operating_cash_flow, None);
        assert_eq!(f.score, 2);
        assert_eq!(f.strength, FScoreStrength::Weak);
    }

    #[test]
    fn test_identical_periods() {
        let statements = statements(json!({
            "income_annual": {
                "Total Revenue": [1000.0, 1000.0],
                "Gross Profit": [400.0, 400.0],
                "Net Income": [100.0, 100.0]
            },
            "balance_annual": {
                "Total Assets": [2000.0, 2000.0],
                "Current Assets": [600.0, 600.0],
                "Current Liabilities": [300.0, 300.0],
                "Long Term Debt": [500.0, 500.0]
            },
            "cash_flow_annual": {
                "Operating Cash Flow": [150.0, 150.0],
                "Capital Expenditure": [-30.0, -30.0]
            }
        }));
        let profile = TickerProfile::new();
        let config = AnalysisConfig::default();
        let analyzer = FundamentalAnalyzer::new(&profile, &statements, None, &config);

        let growth = analyzer.calculate_growth_rates();
        assert_eq!(growth.revenue.one_year, Some(0.0));
        assert_eq!(growth.earnings.one_year, Some(0.0));
        assert_eq!(growth.fcf.one_year, Some(0.0));
        assert_eq!(analyzer.calculate_margins().trend.direction, Some(MarginDirection::Stable));

        let criteria = analyzer.calculate_piotroski_f_score().unwrap().criteria;
        assert_eq!(criteria.roa_increased, Some(false));
        assert_eq!(criteria.long_term_debt_decreased, Some(false));
        assert_eq!(criteria.current_ratio_increased, Some(false));
        assert_eq!(criteria.gross_margin_increased, Some(false));
        assert_eq!(criteria.asset_turnover_increased, Some(false));
        // Only the single-period checks score.
        assert_eq!(criteria.passed(), 3);
    }

    #[test]
    fn test_report_json_shape() {
        let report = analyze_fundamentals(
            &healthy_profile(),
            &healthy_statements(),
            None,
            &AnalysisConfig::default(),
        );
        assert!(report.missing_sections().is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["ticker"], "ACME");
        assert_eq!(json["company_name"], "Acme Corporation");
        assert!(json["growth_rates"]["revenue"]["1y"].is_number());
        assert_eq!(json["margins"]["trend"]["direction"], "Improving");
        assert_eq!(json["quality_scores"]["altman_z"]["zone"], "Safe");
        assert_eq!(json["quality_scores"]["piotroski_f"]["strength"], "Strong");
        assert!(json["quality_scores"]["piotroski_f"]["criteria"]["no_new_shares"].is_null());
    }

    #[test]
    fn test_empty_inputs_degrade_quietly() {
        let report = analyze_fundamentals(
            &TickerProfile::new(),
            &FinancialStatements::default(),
            None,
            &AnalysisConfig::default(),
        );
        assert_eq!(
            report.missing_sections(),
            vec!["growth_rates", "fcf_metrics", "margins", "efficiency", "dupont", "altman_z", "piotroski_f"]
        );
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("fcf_metrics").is_none());
        assert!(json["quality_scores"]["altman_z"].is_null());
    }
}
