use campus_visit::error::AppError;
use campus_visit::visits::{
    AuditRequest, InMemoryVisitStore, VisitApplication, VisitApplicationService, VisitError,
    VisitFilter, VisitPage, VisitStatus, VisitSubmission,
};
use chrono::{Duration, Local};
use clap::Args;
use std::sync::Arc;

const DEMO_UNITS: [&str; 4] = [
    "Tianfu Normal School",
    "Jinjiang Experimental Middle School",
    "Wuhou Primary",
    "Chengdu No.7 High School",
];
const DEMO_CONTACTS: [&str; 3] = ["Li Wei", "Wang Fang", "Chen Jie"];

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Number of applications to seed
    #[arg(long, default_value_t = 12)]
    pub(crate) applications: usize,
    /// Page size used for the printed page
    #[arg(long, default_value_t = 5)]
    pub(crate) page_size: i64,
    /// Case-insensitive visit unit fragment to filter by
    #[arg(long)]
    pub(crate) visit_unit: Option<String>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        applications,
        page_size,
        visit_unit,
    } = args;

    println!("Campus visit registry demo");
    let service = VisitApplicationService::new(Arc::new(InMemoryVisitStore::new()));

    let mut ids = Vec::with_capacity(applications);
    for index in 0..applications {
        let record = service.submit(demo_submission(index))?;
        ids.push(record.id);
    }
    println!("- Seeded {} pending applications", ids.len());

    let decisions = [
        VisitStatus::Approved,
        VisitStatus::Rejected,
        VisitStatus::Cancelled,
    ];
    for (id, target) in ids.iter().zip(decisions) {
        let receipt = service.audit(demo_decision(id.0, target))?;
        println!("  Application {} -> {} ({})", receipt.id, receipt.status, receipt.message);
    }

    if let Some(first) = ids.first() {
        match service.audit(demo_decision(first.0, VisitStatus::Cancelled)) {
            Err(VisitError::AlreadyAudited { id, current }) => {
                println!("  Second audit of {id} refused: already {current}")
            }
            Err(err) => return Err(err.into()),
            Ok(receipt) => println!("  Unexpected second audit of {}", receipt.id),
        }
    }

    let filter = VisitFilter {
        visit_unit,
        ..VisitFilter::default()
    };
    let page = service.pager().get_page(1, page_size, &filter)?;
    render_page(&page, page_size);
    Ok(())
}

fn demo_submission(index: usize) -> VisitSubmission {
    let visit_date = Local::now().date_naive() + Duration::days(7 + (index % 5) as i64);
    VisitSubmission {
        visit_date: Some(visit_date.format("%Y-%m-%d").to_string()),
        visit_unit: Some(DEMO_UNITS[index % DEMO_UNITS.len()].to_string()),
        visit_nature: Some((index % 3) as i64),
        visit_num: Some(20 + (index as i64 % 4) * 10),
        visit_car: None,
        contact_name: Some(DEMO_CONTACTS[index % DEMO_CONTACTS.len()].to_string()),
        contact_phone: Some(format!("1380013{:04}", index)),
        time_slot: None,
    }
}

fn demo_decision(id: i64, target: VisitStatus) -> AuditRequest {
    AuditRequest {
        id: Some(id),
        status: Some(i64::from(target.code())),
        commentator_name: Some("Zhao Min".to_string()),
        commentator_phone: Some("13900000000".to_string()),
        reject_reason: Some("Requested date is fully booked".to_string()),
        update_by: Some("demo-admin".to_string()),
    }
}

fn render_page(page: &VisitPage, page_size: i64) {
    println!(
        "\nPage 1 (size {}) of {} | {} matching applications",
        page_size, page.pages, page.total
    );
    for record in &page.apply_list {
        println!("  {}", describe(record));
    }
}

fn describe(record: &VisitApplication) -> String {
    let mut line = format!(
        "#{} {} | {} visitors on {} | contact {} | {}",
        record.id,
        record.details.visit_unit,
        record.details.visit_num,
        record.details.visit_date,
        record.details.contact_name,
        record.status
    );
    if let Some(reason) = &record.audit.reject_reason {
        line.push_str(&format!(" ({reason})"));
    }
    line
}
