// service/rating_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::MarketStore,
    dtos::marketdtos::CreateRatingDto,
    models::{marketmodel::*, usermodel::User},
    service::{
        access::{require_role, PARTICIPANTS},
        error::{is_unique_violation, ServiceError},
    },
};

/// Mean of all scores rounded to one decimal, and how many there were.
/// An empty ledger reads as `(0.0, 0)`.
pub fn recompute_aggregate(ratings: &[Rating]) -> (f64, i32) {
    if ratings.is_empty() {
        return (0.0, 0);
    }

    let total: i64 = ratings.iter().map(|r| i64::from(r.rating)).sum();
    let count = ratings.len();
    let mean = total as f64 / count as f64;

    ((mean * 10.0).round() / 10.0, count as i32)
}

#[derive(Debug, Clone)]
pub struct RatingService {
    db_client: Arc<dyn MarketStore>,
}

impl RatingService {
    pub fn new(db_client: Arc<dyn MarketStore>) -> Self {
        Self { db_client }
    }

    pub async fn submit_rating(
        &self,
        rater: &User,
        rating_data: CreateRatingDto,
    ) -> Result<Rating, ServiceError> {
        require_role(rater, PARTICIPANTS)?;

        let job_id = rating_data.job_id;
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if !job.is_participant(rater.id) {
            return Err(ServiceError::UnauthorizedJobAccess(rater.id, job_id));
        }

        if !(1..=5).contains(&rating_data.rating) {
            return Err(ServiceError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        let ratee_id = rating_data.to_user_id;
        if self.db_client.get_user(Some(ratee_id), None).await?.is_none() {
            return Err(ServiceError::UserNotFound(ratee_id));
        }

        if self
            .db_client
            .get_rating(job_id, rater.id, ratee_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::DuplicateRating(job_id, ratee_id));
        }

        let rating = self
            .db_client
            .create_rating(
                job_id,
                rater.id,
                ratee_id,
                rating_data.rating,
                rating_data.review,
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ServiceError::DuplicateRating(job_id, ratee_id)
                } else {
                    ServiceError::Database(e)
                }
            })?;

        // Two concurrent ratings for the same user may each recompute from a
        // snapshot missing the other; the last writer wins.
        let received = self.db_client.get_user_ratings(ratee_id).await?;
        let (average, count) = recompute_aggregate(&received);
        self.db_client
            .update_user_rating(ratee_id, average, count)
            .await?;

        tracing::info!(
            "User {} rated {} on job {}: aggregate now {} over {} rating(s)",
            rater.id,
            ratee_id,
            job_id,
            average,
            count
        );
        Ok(rating)
    }

    pub async fn list_ratings_for_user(&self, user_id: Uuid) -> Result<Vec<Rating>, ServiceError> {
        let ratings = self.db_client.get_user_ratings(user_id).await?;
        Ok(ratings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::{
        models::usermodel::UserRole,
        service::{
            error::ErrorKind,
            test_support::{memory_store, next_week, seed_user},
        },
    };

    fn score(value: i16) -> Rating {
        Rating {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            from_user_id: Uuid::new_v4(),
            to_user_id: Uuid::new_v4(),
            rating: value,
            review: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn aggregate_of_nothing_is_zero() {
        assert_eq!(recompute_aggregate(&[]), (0.0, 0));
    }

    #[test]
    fn aggregate_rounds_to_one_decimal() {
        assert_eq!(recompute_aggregate(&[score(5)]), (5.0, 1));
        assert_eq!(recompute_aggregate(&[score(4), score(5)]), (4.5, 2));
        assert_eq!(recompute_aggregate(&[score(4), score(4), score(5)]), (4.3, 3));
        assert_eq!(recompute_aggregate(&[score(1), score(2), score(2)]), (1.7, 3));
    }

    #[test]
    fn aggregate_ignores_order() {
        let forward = [score(1), score(3), score(5), score(2)];
        let backward = [score(2), score(5), score(3), score(1)];
        assert_eq!(recompute_aggregate(&forward), recompute_aggregate(&backward));
    }

    struct Fixture {
        db: Arc<dyn MarketStore>,
        service: RatingService,
        client: User,
        freelancer: User,
        job: Job,
    }

    async fn fixture() -> Fixture {
        let db = memory_store();
        let client = seed_user(&db, "Carol", UserRole::Client).await;
        let freelancer = seed_user(&db, "Frank", UserRole::Freelancer).await;
        let job = db
            .create_job(
                client.id,
                "Logo".to_string(),
                "Vector logo".to_string(),
                "design".to_string(),
                150.0,
                next_week(),
            )
            .await
            .unwrap();
        let job = db.claim_open_job(job.id, freelancer.id).await.unwrap().unwrap();
        let service = RatingService::new(db.clone());
        Fixture {
            db,
            service,
            client,
            freelancer,
            job,
        }
    }

    fn rate(job_id: Uuid, to_user_id: Uuid, rating: i16) -> CreateRatingDto {
        CreateRatingDto {
            job_id,
            to_user_id,
            rating,
            review: Some("Great work".to_string()),
        }
    }

    #[tokio::test]
    async fn participants_rate_each_other_and_aggregate_updates() {
        let f = fixture().await;

        f.service
            .submit_rating(&f.client, rate(f.job.id, f.freelancer.id, 4))
            .await
            .unwrap();
        let freelancer = f
            .db
            .get_user(Some(f.freelancer.id), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!((freelancer.rating, freelancer.ratings_count), (4.0, 1));

        f.service
            .submit_rating(&f.freelancer, rate(f.job.id, f.client.id, 5))
            .await
            .unwrap();
        let client = f.db.get_user(Some(f.client.id), None).await.unwrap().unwrap();
        assert_eq!((client.rating, client.ratings_count), (5.0, 1));

        let received = f.service.list_ratings_for_user(f.freelancer.id).await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].from_user_id, f.client.id);
    }

    #[tokio::test]
    async fn duplicate_rating_is_rejected_and_aggregate_unchanged() {
        let f = fixture().await;

        f.service
            .submit_rating(&f.client, rate(f.job.id, f.freelancer.id, 4))
            .await
            .unwrap();
        let err = f
            .service
            .submit_rating(&f.client, rate(f.job.id, f.freelancer.id, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateRating(_, _)));

        let freelancer = f
            .db
            .get_user(Some(f.freelancer.id), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!((freelancer.rating, freelancer.ratings_count), (4.0, 1));
    }

    #[tokio::test]
    async fn outsiders_and_bad_scores_are_refused() {
        let f = fixture().await;
        let outsider = seed_user(&f.db, "Olga", UserRole::Freelancer).await;

        let err = f
            .service
            .submit_rating(&outsider, rate(f.job.id, f.client.id, 3))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let err = f
            .service
            .submit_rating(&f.client, rate(f.job.id, f.freelancer.id, 6))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = f
            .service
            .submit_rating(&f.client, rate(Uuid::new_v4(), f.freelancer.id, 3))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = f
            .service
            .submit_rating(&f.client, rate(f.job.id, Uuid::new_v4(), 3))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UserNotFound(_)));
    }
}
