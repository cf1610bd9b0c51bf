//! Records present on a fresh site
//!
//! Collections start from these lists until the first save writes a snapshot.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use super::analytics::{DailyVisitors, MonthlyVisitors, PageViews, TrafficSource, VisitorStats};
use super::blog_post::{Author, BlogPost, PostStatus};
use super::content::{
    Achievement, Application, LiteratureItem, Message, PortfolioItem, PressMention, ProjectStatus,
    PublishState, Resource, Training, TrainingLevel, TrainingStatus,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn timestamp(y: i32, m: u32, d: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).single()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub(super) fn blog_posts() -> Vec<BlogPost> {
    let post = |id: i64,
                title: &str,
                slug: &str,
                category: &str,
                status: PostStatus,
                published: Option<DateTime<Utc>>,
                views: u64,
                excerpt: &str,
                content: &str,
                tags: &[&str]| BlogPost {
        id,
        title: title.to_string(),
        slug: slug.to_string(),
        content: content.to_string(),
        excerpt: excerpt.to_string(),
        featured_image: "/placeholder.svg".to_string(),
        category: category.to_string(),
        tags: strings(tags),
        status,
        author: Author::default(),
        publish_date: published,
        last_modified: published,
        views,
        featured: id == 1,
        ..Default::default()
    };

    vec![
        post(
            1,
            "Design Trends for 2025",
            "design-trends-for-2025",
            "Design",
            PostStatus::Published,
            timestamp(2025, 4, 20),
            452,
            "A look at the visual directions shaping interfaces, brands and products this year.",
            "## Bold minimalism\n\nInterfaces keep getting simpler, but the typography gets louder. \
             Large type, generous whitespace and a single accent color carry most layouts.\n\n\
             ## Motion with purpose\n\nMicro-interactions now explain state changes instead of \
             decorating them.\n\n> Good motion answers the question *what just happened?*\n\n\
             ## Inclusive palettes\n\nContrast-aware color systems are becoming the default in \
             design tools.",
            &["Design", "UI", "Trends"],
        ),
        post(
            2,
            "Introduction to React Hooks",
            "introduction-to-react-hooks",
            "Development",
            PostStatus::Published,
            timestamp(2025, 4, 15),
            321,
            "Understand state and effects in function components with a few practical examples.",
            "Hooks let function components hold state and react to lifecycle events.\n\n\
             ## useState\n\n```\nconst [count, setCount] = useState(0);\n```\n\n\
             ## useEffect\n\nEffects run after render. Return a cleanup function to undo \
             subscriptions.\n\n- Keep effects small\n- List every dependency\n- Prefer derived \
             values over extra state",
            &["React", "JavaScript", "Frontend"],
        ),
        post(
            3,
            "Mastering Social Media Marketing",
            "mastering-social-media-marketing",
            "Marketing",
            PostStatus::Published,
            timestamp(2025, 4, 10),
            287,
            "Plan, publish and measure social content that earns attention instead of buying it.",
            "Consistent publishing beats viral luck.\n\n## Build a calendar\n\nPlan a month ahead \
             and leave room for timely posts.\n\n## Measure what matters\n\n1. Reach\n2. \
             Engagement rate\n3. Conversions\n\nVanity metrics are easy to grow and hard to \
             monetize.",
            &["Social Media", "Marketing"],
        ),
        post(
            4,
            "The Future of Mobile App Design",
            "the-future-of-mobile-app-design",
            "Design",
            PostStatus::Draft,
            None,
            0,
            "Foldables, gestures and on-device AI are changing what a mobile screen can be.",
            "Screens are no longer a fixed rectangle. Layouts have to adapt to hinges, split views \
             and desktop modes.\n\n## Gesture-first navigation\n\nBottom sheets and swipe actions \
             replace most visible chrome.",
            &["Mobile", "Design"],
        ),
        post(
            5,
            "Building Accessible Websites",
            "building-accessible-websites",
            "Development",
            PostStatus::Scheduled,
            timestamp(2025, 4, 25),
            0,
            "Practical steps to make every page usable with a keyboard and a screen reader.",
            "Accessibility starts with semantic HTML.\n\n## Checklist\n\n- Every image has alt \
             text\n- Focus is always visible\n- Color is never the only signal\n- Forms have \
             labels\n\nTest with a keyboard before you test with a mouse.",
            &["Accessibility", "HTML"],
        ),
    ]
}

pub(super) fn portfolio_items() -> Vec<PortfolioItem> {
    let item = |id: i64,
                title: &str,
                category: &str,
                client: &str,
                completion: Option<NaiveDate>,
                featured: bool,
                images_count: u32,
                status: ProjectStatus,
                url: Option<&str>| PortfolioItem {
        id,
        title: title.to_string(),
        category: category.to_string(),
        client: client.to_string(),
        completion_date: completion,
        featured,
        images_count,
        status,
        url: url.map(str::to_string),
    };

    vec![
        item(1, "E-Commerce Website Redesign", "Web Design", "Fashion Store", Some(date(2025, 3, 15)), true, 6, ProjectStatus::Completed, Some("https://example.com/project1")),
        item(2, "Mobile Banking App UI", "Mobile App", "Finance Bank", Some(date(2025, 2, 10)), true, 8, ProjectStatus::Completed, Some("https://example.com/project2")),
        item(3, "Corporate Brand Identity", "Branding", "Tech Solutions Inc", Some(date(2025, 1, 20)), false, 5, ProjectStatus::Completed, None),
        item(4, "Educational Platform Design", "Web Design", "Online Academy", Some(date(2024, 12, 5)), false, 4, ProjectStatus::Completed, Some("https://example.com/project4")),
        item(5, "Social Media Dashboard", "Web Application", "Marketing Agency", None, false, 2, ProjectStatus::InProgress, None),
    ]
}

pub(super) fn applications() -> Vec<Application> {
    let app = |id: i64, title: &str, category: &str, platforms: &[&str], status: PublishState, updated: NaiveDate| {
        Application {
            id,
            title: title.to_string(),
            category: category.to_string(),
            platforms: strings(platforms),
            status,
            last_updated: updated,
        }
    };

    vec![
        app(1, "Task Manager Pro", "web", &["web", "ios", "android"], PublishState::Published, date(2025, 4, 15)),
        app(2, "Design Portfolio", "web", &["web"], PublishState::Published, date(2025, 4, 10)),
        app(3, "Fitness Tracker", "mobile", &["ios", "android"], PublishState::Published, date(2025, 4, 5)),
        app(4, "Language Learning App", "mobile", &["ios", "android"], PublishState::Draft, date(2025, 4, 2)),
        app(5, "Social Media Dashboard", "web", &["web"], PublishState::Published, date(2025, 3, 28)),
    ]
}

pub(super) fn trainings() -> Vec<Training> {
    let course = |id: i64,
                  title: &str,
                  category: &str,
                  level: TrainingLevel,
                  duration: &str,
                  registrations: u32,
                  status: TrainingStatus,
                  updated: NaiveDate| Training {
        id,
        title: title.to_string(),
        category: category.to_string(),
        level,
        duration: duration.to_string(),
        registrations,
        status,
        last_updated: updated,
    };

    vec![
        course(1, "Modern Web Development with React", "webDev", TrainingLevel::Intermediate, "24 hours", 45, TrainingStatus::Active, date(2025, 4, 15)),
        course(2, "UX/UI Design Fundamentals", "design", TrainingLevel::Beginner, "16 hours", 32, TrainingStatus::Active, date(2025, 4, 10)),
        course(3, "Mobile App Development with Flutter", "mobileDev", TrainingLevel::Intermediate, "30 hours", 28, TrainingStatus::Active, date(2025, 4, 5)),
        course(4, "Social Media Marketing Strategies", "social", TrainingLevel::Beginner, "12 hours", 50, TrainingStatus::Draft, date(2025, 4, 2)),
        course(5, "Advanced Backend Development with Node.js", "webDev", TrainingLevel::Advanced, "20 hours", 18, TrainingStatus::Completed, date(2025, 3, 28)),
    ]
}

pub(super) fn achievements() -> Vec<Achievement> {
    let achievement = |id: i64, title: &str, category: &str, on: NaiveDate, location: &str, featured: bool, images_count: u32| {
        Achievement {
            id,
            title: title.to_string(),
            category: category.to_string(),
            date: on,
            location: location.to_string(),
            featured,
            images_count,
        }
    };

    vec![
        achievement(1, "Best Designer of the Year Award", "Award", date(2023, 6, 15), "Dubai, UAE", true, 5),
        achievement(2, "Advanced Web Development Certification", "Certification", date(2022, 11, 30), "Online", false, 2),
        achievement(3, "Best App Award for \"Smart Assistant\"", "Award", date(2021, 9, 22), "San Francisco, USA", true, 3),
        achievement(4, "Keynote Speaker at Web Tech Conference", "Recognition", date(2023, 3, 15), "London, UK", false, 4),
        achievement(5, "Digital Transformation Project Success", "Success Story", date(2022, 7, 10), "Riyadh, KSA", true, 6),
    ]
}

pub(super) fn literature() -> Vec<LiteratureItem> {
    let piece = |id: i64, title: &str, category: &str, excerpt: &str, on: NaiveDate| LiteratureItem {
        id,
        title: title.to_string(),
        category: category.to_string(),
        image: "/placeholder.svg".to_string(),
        excerpt: excerpt.to_string(),
        date: on,
    };

    vec![
        piece(1, "Journey in the World of Design", "Articles", "Deep reflections on design philosophy and creativity in the digital age", date(2023, 5, 10)),
        piece(2, "Inspiring Quotes", "Quotes", "A collection of quotes that have inspired me in my professional journey", date(2023, 4, 22)),
        piece(3, "The Future of Technology", "Articles", "A look at upcoming technological trends and their impact on our lives", date(2023, 3, 15)),
        piece(4, "Creative Thoughts", "Thoughts", "A series of creative ideas aimed at inspiring designers and developers", date(2023, 2, 28)),
    ]
}

pub(super) fn press() -> Vec<PressMention> {
    let mention = |id: i64, title: &str, outlet: &str, category: &str, on: NaiveDate, url: Option<&str>, featured: bool| {
        PressMention {
            id,
            title: title.to_string(),
            outlet: outlet.to_string(),
            category: category.to_string(),
            date: on,
            url: url.map(str::to_string),
            featured,
        }
    };

    vec![
        mention(1, "Designing for a Bilingual Web", "Tech Review Arabia", "Interview", date(2025, 3, 12), Some("https://example.com/press/bilingual-web"), true),
        mention(2, "Award Winners Announced at Dubai Design Week", "Gulf Creative", "News", date(2023, 6, 18), Some("https://example.com/press/design-week"), true),
        mention(3, "Training the Next Generation of Web Developers", "Riyadh Daily", "Feature", date(2024, 10, 2), None, false),
    ]
}

pub(super) fn resources() -> Vec<Resource> {
    let resource = |id: i64,
                    title: &str,
                    description: &str,
                    category: &str,
                    file_type: &str,
                    size: &str,
                    downloadable: bool,
                    featured: bool,
                    downloads: u64| Resource {
        id,
        title: title.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        file_type: file_type.to_string(),
        size: size.to_string(),
        downloadable,
        featured,
        downloads,
    };

    vec![
        resource(1, "Curriculum Vitae (CV)", "Official and updated curriculum vitae", "CV", "PDF", "1.2 MB", true, true, 145),
        resource(2, "Web Design Basics - A Simple Guide", "A comprehensive guide to web design basics for beginners", "Design", "PDF", "3.5 MB", true, false, 87),
        resource(3, "Project Plan Template", "Ready-to-use template for planning digital projects", "Templates", "DOCX", "0.8 MB", true, false, 63),
        resource(4, "React.js Fundamentals - Slides", "Presentation slides from React.js workshop", "Development", "PPTX", "5.2 MB", true, true, 104),
        resource(5, "UX Design Wireframes", "Collection of editable UX design wireframes", "Design", "AI", "15.7 MB", false, false, 0),
    ]
}

pub(super) fn messages() -> Vec<Message> {
    let message = |id: i64, sender: &str, email: &str, subject: &str, body: &str, on: NaiveDate, read: bool| Message {
        id,
        sender: sender.to_string(),
        email: email.to_string(),
        subject: subject.to_string(),
        message: body.to_string(),
        date: on,
        read,
    };

    vec![
        message(1, "John Smith", "john.smith@example.com", "Website Design Inquiry", "Hi Ahmed, I was wondering if you are available for a website design project...", date(2025, 4, 22), true),
        message(2, "Sarah Johnson", "sarah.j@example.com", "Speaking Opportunity", "Hello, I would like to invite you to speak at our upcoming tech conference...", date(2025, 4, 20), false),
        message(3, "Mohammad Al-Farsi", "malfarsi@example.com", "Collaboration Proposal", "Dear Ahmed, I have been following your work and would like to propose a collaboration...", date(2025, 4, 18), false),
        message(4, "Laura Chen", "laura.chen@example.com", "Consultation Request", "Hello Ahmed, I am looking for a consultation on a digital transformation project...", date(2025, 4, 15), true),
        message(5, "Carlos Rodriguez", "carlos.r@example.com", "Job Opportunity", "Dear Mr. Jamal, I am writing to you about a senior position at our company...", date(2025, 4, 12), true),
    ]
}

pub(super) fn visitor_stats() -> VisitorStats {
    let daily = [("Mon", 450), ("Tue", 630), ("Wed", 850), ("Thu", 790), ("Fri", 550), ("Sat", 380), ("Sun", 420)]
        .into_iter()
        .map(|(name, visitors)| DailyVisitors { name: name.to_string(), visitors })
        .collect();

    let monthly = [("Jan", 2800), ("Feb", 3200), ("Mar", 4100), ("Apr", 3900), ("May", 4600), ("Jun", 5200)]
        .into_iter()
        .map(|(name, visitors)| MonthlyVisitors { name: name.to_string(), visitors })
        .collect();

    let sources = [("Direct", 35), ("Search", 28), ("Social", 22), ("Referral", 15)]
        .into_iter()
        .map(|(name, value)| TrafficSource { name: name.to_string(), value })
        .collect();

    let pages = [("Home", 3250), ("Portfolio", 2430), ("CV", 1980), ("Blog", 1540), ("Contact", 890)]
        .into_iter()
        .map(|(name, views)| PageViews { name: name.to_string(), views })
        .collect();

    VisitorStats { daily, monthly, sources, pages }
}
