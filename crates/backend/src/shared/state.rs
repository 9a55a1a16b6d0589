use std::sync::Arc;

use contracts::domain::a001_link::CategoryRoots;
use sea_orm::DatabaseConnection;

use crate::domain::a001_link::{LinkAdminService, SqlLinkStore};
use crate::domain::a002_article::ArticleService;
use crate::domain::a003_subscriber::SubscriberService;
use crate::domain::a004_notification::{Mailer, NotificationService};
use crate::shared::config::Config;
use crate::system::auth::jwt::JwtKeys;
use crate::system::users::UserDirectory;

/// Everything a request handler needs, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtKeys>,
    pub categories: Arc<CategoryRoots>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        config: Config,
        jwt: JwtKeys,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let categories = Arc::new(config.portal.category_roots());
        Self {
            db,
            config: Arc::new(config),
            jwt: Arc::new(jwt),
            categories,
            mailer,
        }
    }

    pub fn users(&self) -> UserDirectory {
        UserDirectory::new(self.db.clone())
    }

    pub fn links(&self) -> LinkAdminService<SqlLinkStore, UserDirectory> {
        LinkAdminService::new(
            SqlLinkStore::new(self.db.clone(), self.categories.clone()),
            self.users(),
            self.categories.clone(),
        )
    }

    pub fn articles(&self) -> ArticleService {
        ArticleService::new(self.db.clone())
    }

    pub fn subscribers(&self) -> SubscriberService {
        SubscriberService::new(self.db.clone(), self.categories.clone())
    }

    pub fn notifications(&self) -> NotificationService {
        NotificationService::new(
            self.db.clone(),
            self.subscribers(),
            self.mailer.clone(),
            &self.config.mail,
            &self.config.portal,
        )
    }
}
