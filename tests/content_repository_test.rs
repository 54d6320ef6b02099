mod common;

use chrono::{Duration, Utc};
use member_portal::{
    domain::{
        AnnouncementFilter, CreateAnnouncementRequest, CreateCourseRequest, CreatePartnerRequest,
        UpdateAnnouncementRequest, UpdateCourseRequest, UpdatePartnerRequest,
    },
    error::AppError,
    repository::{
        AnnouncementRepository, CourseRepository, PartnerRepository,
        SqliteAnnouncementRepository, SqliteCourseRepository, SqlitePartnerRepository,
    },
};

fn announcement(title: &str, days_from_today: i64, expires_in_days: Option<i64>) -> CreateAnnouncementRequest {
    let today = Utc::now().date_naive();
    CreateAnnouncementRequest {
        title: title.to_string(),
        body: format!("{} body", title),
        published_at: today + Duration::days(days_from_today),
        expires_at: expires_in_days.map(|d| today + Duration::days(d)),
    }
}

#[tokio::test]
async fn test_announcement_visibility() -> anyhow::Result<()> {
    let pool = common::test_pool().await?;
    let repo = SqliteAnnouncementRepository::new(pool);

    let current = repo.create(announcement("Current", -1, Some(5)), None).await?;
    let expired = repo.create(announcement("Expired", -10, Some(-1)), None).await?;
    let open_ended = repo.create(announcement("Open", -3, None), None).await?;
    let inactive = repo.create(announcement("Inactive", -2, None), None).await?;
    repo.update(inactive.id, UpdateAnnouncementRequest {
        is_active: Some(false),
        ..Default::default()
    }).await?;

    // Expiring today is still visible until the end of the day
    let today = repo.create(announcement("Today", -2, Some(0)), None).await?;

    let visible: Vec<_> = repo.list(AnnouncementFilter::visible()).await?
        .into_iter()
        .map(|a| a.id)
        .collect();
    // Newest publication first
    assert_eq!(visible, vec![current.id, today.id, open_ended.id]);

    let all = repo.list(AnnouncementFilter::all()).await?;
    assert_eq!(all.len(), 5);
    assert!(all.iter().any(|a| a.id == expired.id));
    assert!(all.iter().any(|a| a.id == inactive.id));

    Ok(())
}

#[tokio::test]
async fn test_announcement_update_and_delete() -> anyhow::Result<()> {
    let pool = common::test_pool().await?;
    let repo = SqliteAnnouncementRepository::new(pool);

    let created = repo.create(announcement("Draft", 0, Some(3)), None).await?;
    assert!(created.expires_at.is_some());

    let updated = repo.update(created.id, UpdateAnnouncementRequest {
        title: Some("Final".to_string()),
        expires_at: Some(None),
        ..Default::default()
    }).await?;
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.body, "Draft body");
    assert!(updated.expires_at.is_none());

    repo.delete(created.id).await?;
    assert!(repo.find_by_id(created.id).await?.is_none());
    assert!(matches!(repo.delete(created.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(
        repo.update(created.id, UpdateAnnouncementRequest::default()).await,
        Err(AppError::NotFound(_))
    ));

    Ok(())
}

#[tokio::test]
async fn test_course_active_filter() -> anyhow::Result<()> {
    let pool = common::test_pool().await?;
    let repo = SqliteCourseRepository::new(pool);

    let course = repo.create(CreateCourseRequest {
        title: "Ultrassom".to_string(),
        description: "Módulo básico".to_string(),
        image_url: Some("https://img.example.com/us.png".to_string()),
        access_url: "https://cursos.example.com/us".to_string(),
    }, None).await?;
    assert!(course.is_active);

    let hidden = repo.create(CreateCourseRequest {
        title: "Arquivado".to_string(),
        description: "Turma encerrada".to_string(),
        image_url: None,
        access_url: "https://cursos.example.com/old".to_string(),
    }, None).await?;
    let hidden = repo.update(hidden.id, UpdateCourseRequest {
        is_active: Some(false),
        ..Default::default()
    }).await?;
    assert!(!hidden.is_active);

    let cleared = repo.update(course.id, UpdateCourseRequest {
        image_url: Some(None),
        ..Default::default()
    }).await?;
    assert!(cleared.image_url.is_none());
    assert_eq!(cleared.title, "Ultrassom");

    assert_eq!(repo.list(None).await?.len(), 2);
    let active = repo.list(Some(true)).await?;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, course.id);

    repo.delete(hidden.id).await?;
    assert_eq!(repo.list(None).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_partner_crud() -> anyhow::Result<()> {
    let pool = common::test_pool().await?;
    let repo = SqlitePartnerRepository::new(pool);

    let zeta = repo.create(CreatePartnerRequest {
        name: "Zeta Seguros".to_string(),
        description: "Descontos".to_string(),
        link_url: "https://zeta.example.com".to_string(),
        logo_url: None,
    }).await?;
    let alfa = repo.create(CreatePartnerRequest {
        name: "Alfa Clínicas".to_string(),
        description: "Convênio".to_string(),
        link_url: "https://alfa.example.com".to_string(),
        logo_url: Some("https://alfa.example.com/logo.png".to_string()),
    }).await?;

    // Alphabetical
    let names: Vec<String> = repo.list(None).await?.into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Alfa Clínicas".to_string(), "Zeta Seguros".to_string()]);

    repo.update(zeta.id, UpdatePartnerRequest {
        is_active: Some(false),
        ..Default::default()
    }).await?;

    let active = repo.list(Some(true)).await?;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, alfa.id);

    repo.delete(zeta.id).await?;
    assert!(repo.find_by_id(zeta.id).await?.is_none());

    Ok(())
}
