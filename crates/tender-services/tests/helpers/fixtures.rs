use tender_core::models::{
    Bid, BidHistory, CreateBidRequest, CreateTenderRequest, Organization, OrganizationType, Tender,
    TenderHistory, User,
};
use tender_core::PageParams;
use tender_db::VersionedStore;
use uuid::Uuid;

use super::TestApp;

/// An organization with its responsible users
pub struct TestOrg {
    pub organization: Organization,
    pub members: Vec<User>,
}

impl TestOrg {
    pub fn id(&self) -> Uuid {
        self.organization.id
    }

    pub fn owner(&self) -> &User {
        &self.members[0]
    }
}

pub fn page(limit: i64, offset: i64) -> PageParams {
    PageParams::new(limit, offset)
}

impl TestApp {
    pub async fn user(&self, username: &str) -> User {
        self.store.add_user(username).await
    }

    /// Organization with `count` responsible users named `{name}-{i}`
    pub async fn organization(&self, name: &str, count: usize) -> TestOrg {
        let organization = self.store.add_organization(name, OrganizationType::Llc).await;
        let mut members = Vec::with_capacity(count);
        for i in 0..count {
            let user = self.store.add_user(&format!("{}-{}", name, i)).await;
            self.store.add_membership(organization.id, user.id).await;
            members.push(user);
        }
        TestOrg {
            organization,
            members,
        }
    }

    pub async fn create_tender(&self, org: &TestOrg, name: &str, service_type: &str) -> Tender {
        self.engine
            .tenders
            .create(CreateTenderRequest {
                name: name.to_string(),
                description: format!("{} description", name),
                service_type: service_type.to_string(),
                organization_id: org.id(),
                creator_username: org.owner().username.clone(),
            })
            .await
            .expect("tender creation failed")
    }

    pub async fn published_tender(&self, org: &TestOrg) -> Tender {
        let tender = self.create_tender(org, "Bridge", "Construction").await;
        self.engine
            .tenders
            .set_status(&org.owner().username, tender.id, "Published")
            .await
            .expect("tender publication failed")
    }

    pub async fn create_bid(&self, tender: &Tender, author: &User, author_type: &str) -> Bid {
        self.engine
            .bids
            .create(CreateBidRequest {
                name: format!("Offer by {}", author.username),
                description: "Fast and cheap".to_string(),
                tender_id: tender.id,
                author_type: author_type.to_string(),
                author_id: author.id,
            })
            .await
            .expect("bid creation failed")
    }

    pub async fn published_bid(&self, tender: &Tender, author: &User) -> Bid {
        let bid = self.create_bid(tender, author, "User").await;
        self.engine
            .bids
            .set_status(&author.username, bid.id, "Published")
            .await
            .expect("bid publication failed")
    }

    pub async fn tender(&self, id: Uuid) -> Tender {
        VersionedStore::<Tender>::find(&self.store, id)
            .await
            .unwrap()
            .expect("tender not found")
    }

    pub async fn bid(&self, id: Uuid) -> Bid {
        VersionedStore::<Bid>::find(&self.store, id)
            .await
            .unwrap()
            .expect("bid not found")
    }

    pub async fn tender_history(&self, id: Uuid) -> Vec<TenderHistory> {
        VersionedStore::<Tender>::list_history(&self.store, id).await.unwrap()
    }

    pub async fn bid_history(&self, id: Uuid) -> Vec<BidHistory> {
        VersionedStore::<Bid>::list_history(&self.store, id).await.unwrap()
    }
}
