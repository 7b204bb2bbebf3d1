//! Database seeder for Folio development and testing.
//!
//! Seeds lookup tables, the organization profile and one demo report
//! (definition, template, column labels and its data-source function) for
//! local development.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set};
use folio_db::entities::{
    charge_types, column_mappings, lookup_months, organization_profile, report_definitions,
    report_templates, settlements,
};

const DEMO_REPORT: &str = "DemoArrears";

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Input names of the demo function. Arguments bind by name against the
/// normalized request keys, so these follow the enrichment parameters.
const DEMO_MONTH_PARAM: &str = "month";
const DEMO_CHARGE_TYPE_PARAM: &str = "chargetype";

fn demo_function_sql() -> String {
    format!(
        r"
DROP FUNCTION IF EXISTS rpt_demo_arrears(integer, varchar);
CREATE FUNCTION rpt_demo_arrears({month} integer, {charge} varchar DEFAULT NULL)
RETURNS TABLE (account text, holder text, charge_type varchar, amount numeric, due date)
LANGUAGE sql STABLE AS $$
    SELECT a.account, a.holder, a.charge_type, a.amount,
           make_date(2026, rpt_demo_arrears.{month}, 28)
    FROM (VALUES
        ('A-1001', 'Ndlovu, T.', '10', 1250.00),
        ('A-1002', 'Botha & Sons', '20', 87.45),
        ('A-1003', 'Mokoena, L.', '10', 4310.10)
    ) AS a(account, holder, charge_type, amount)
    WHERE rpt_demo_arrears.{month} BETWEEN 1 AND 12
      AND (rpt_demo_arrears.{charge} IS NULL
           OR rpt_demo_arrears.{charge} = ''
           OR a.charge_type = rpt_demo_arrears.{charge})
$$;
",
        month = DEMO_MONTH_PARAM,
        charge = DEMO_CHARGE_TYPE_PARAM,
    )
}

const DEMO_TEMPLATE: &str = r#"<html>
<head><title>{{@title}}</title></head>
<body>
<h1>{{@title}}</h1>
<p>{{param:OrganizationName}} - {{param:MonthName}} ({{param:PeriodName}}), {{param:ChargeTypeName}}</p>
<table>
  <tr><th>{{header:account}}</th><th>{{header:holder}}</th><th>{{header:arrears_amount}}</th><th>{{header:due}}</th></tr>
  <tr data-table-row="arrears"><td>{{account}}</td><td>{{holder}}</td><td>{{amount}}</td><td>{{due}}</td></tr>
</table>
<p>Printed {{@datetime}}</p>
</body>
</html>"#;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = folio_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding lookup months...");
    seed_months(&db).await;

    println!("Seeding charge types and settlements...");
    seed_codes(&db).await;

    println!("Seeding organization profile...");
    seed_organization(&db).await;

    println!("Seeding demo report...");
    seed_demo_report(&db).await;

    println!("Seeding complete!");
}

/// Seeds month and quarter names.
async fn seed_months(db: &DatabaseConnection) {
    for (month, name) in (1_i16..).zip(MONTHS) {
        if lookup_months::Entity::find_by_id(month)
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            continue;
        }

        let row = lookup_months::ActiveModel {
            month: Set(month),
            name: Set(name.to_string()),
            period_name: Set(format!("Q{}", (month - 1) / 3 + 1)),
        };
        if let Err(e) = row.insert(db).await {
            eprintln!("Failed to insert month {month}: {e}");
        }
    }
    println!("  Months ready");
}

/// Seeds charge-type and settlement codes.
async fn seed_codes(db: &DatabaseConnection) {
    for (code, name) in [("10", "Water"), ("20", "Sewerage"), ("30", "Refuse")] {
        if charge_types::Entity::find_by_id(code.to_string())
            .one(db)
            .await
            .ok()
            .flatten()
            .is_none()
        {
            let row = charge_types::ActiveModel {
                code: Set(code.to_string()),
                name: Set(name.to_string()),
            };
            if let Err(e) = row.insert(db).await {
                eprintln!("Failed to insert charge type {code}: {e}");
            }
        }
    }

    for (code, name) in [("7", "Northbank"), ("8", "Southbank")] {
        if settlements::Entity::find_by_id(code.to_string())
            .one(db)
            .await
            .ok()
            .flatten()
            .is_none()
        {
            let row = settlements::ActiveModel {
                code: Set(code.to_string()),
                name: Set(name.to_string()),
            };
            if let Err(e) = row.insert(db).await {
                eprintln!("Failed to insert settlement {code}: {e}");
            }
        }
    }
    println!("  Codes ready");
}

/// Seeds the single organization profile row.
async fn seed_organization(db: &DatabaseConnection) {
    if organization_profile::Entity::find_by_id(1_i16)
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Organization profile already exists, skipping...");
        return;
    }

    let profile = organization_profile::ActiveModel {
        id: Set(1),
        name: Set("Riverside Council".to_string()),
    };
    if let Err(e) = profile.insert(db).await {
        eprintln!("Failed to insert organization profile: {e}");
    } else {
        println!("  Created organization profile: Riverside Council");
    }
}

/// Seeds the demo report and its data-source function.
async fn seed_demo_report(db: &DatabaseConnection) {
    if let Err(e) = db.execute_unprepared(&demo_function_sql()).await {
        eprintln!("Failed to create demo function: {e}");
        return;
    }

    let key = DEMO_REPORT.to_lowercase();
    if report_templates::Entity::find_by_id(key.clone())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Demo report already exists, skipping...");
        return;
    }

    let definition = report_definitions::ActiveModel {
        name: Set(DEMO_REPORT.to_string()),
        title: Set("Arrears by account".to_string()),
        stored_proc_name: Set("rpt_demo_arrears".to_string()),
        merge_mode: Set("union".to_string()),
        dataset: Set("arrears".to_string()),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };
    if let Err(e) = definition.insert(db).await {
        eprintln!("Failed to insert demo definition: {e}");
        return;
    }

    let template = report_templates::ActiveModel {
        report_key: Set(key),
        body: Set(DEMO_TEMPLATE.to_string()),
        updated_at: Set(Utc::now().into()),
    };
    if let Err(e) = template.insert(db).await {
        eprintln!("Failed to insert demo template: {e}");
        return;
    }

    for (table, column, label) in [
        (None, "account", "Account"),
        (None, "holder", "Account holder"),
        (Some("arrears"), "amount", "Amount in arrears"),
        (None, "due", "Due date"),
    ] {
        let mapping = column_mappings::ActiveModel {
            sources_key: Set("rpt_demo_arrears".to_string()),
            table_name: Set(table.map(String::from)),
            column_name: Set(column.to_string()),
            label: Set(label.to_string()),
            ..Default::default()
        };
        if let Err(e) = mapping.insert(db).await {
            eprintln!("Failed to insert column label {column}: {e}");
        }
    }

    println!("  Created demo report: {DEMO_REPORT}");
}
