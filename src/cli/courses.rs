use std::error::Error;

use crate::api::courses::{fetch_course_stats, sort_titles};
use crate::api::CourseStats;
use crate::core::transport::build_client;

pub async fn list_courses(base_url: &str) -> Result<(), Box<dyn Error>> {
    let client = build_client()?;
    let stats = fetch_course_stats(&client, base_url)
        .await
        .map_err(|err| format!("❌ Could not fetch courses from {base_url}: {err}"))?;
    print!("{}", format_course_list(stats));
    Ok(())
}

fn format_course_list(mut stats: CourseStats) -> String {
    sort_titles(&mut stats.course_titles);
    let mut out = match stats.total_courses {
        1 => "1 course available\n".to_string(),
        n => format!("{n} courses available\n"),
    };
    for title in &stats.course_titles {
        out.push_str(&format!("  • {title}\n"));
    }
    out
}
