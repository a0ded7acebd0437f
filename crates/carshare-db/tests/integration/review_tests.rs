use carshare_core::error::AppError;
use carshare_core::models::NewReview;
use carshare_core::search::Page;
use carshare_core::traits::ReviewStore;
use uuid::Uuid;

use crate::integration::common::{seed_user, setup_test_db};

#[tokio::test]
async fn insert_and_get_review() {
    let (db, _container) = setup_test_db().await;
    let alice = seed_user(&db, "alice", None).await;
    let bob = seed_user(&db, "bob", None).await;
    let repo = db.review_repo();

    let review = NewReview {
        rental_id: Uuid::new_v4(),
        reviewer_id: alice.id,
        reviewee_id: bob.id,
        rating: 4,
        comment: "Friendly and on time".into(),
    };
    let created = repo.insert(&review).await.unwrap();

    assert_eq!(created.review.rating, 4);
    assert_eq!(created.reviewer.username, "alice");
    assert_eq!(created.reviewee.username, "bob");

    let fetched = repo
        .get(created.review.id)
        .await
        .unwrap()
        .expect("Should find the review");
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn list_for_user_returns_received_reviews_newest_first() {
    let (db, _container) = setup_test_db().await;
    let alice = seed_user(&db, "alice", None).await;
    let bob = seed_user(&db, "bob", None).await;
    let repo = db.review_repo();

    for rating in 1..=3 {
        repo.insert(&NewReview {
            rental_id: Uuid::new_v4(),
            reviewer_id: alice.id,
            reviewee_id: bob.id,
            rating,
            comment: format!("Review {rating}"),
        })
        .await
        .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    // A review written by bob must not show up in his received list.
    repo.insert(&NewReview {
        rental_id: Uuid::new_v4(),
        reviewer_id: bob.id,
        reviewee_id: alice.id,
        rating: 5,
        comment: "Great renter".into(),
    })
    .await
    .unwrap();

    let received = repo
        .list_for_user(bob.id, Page { skip: 0, limit: 2 })
        .await
        .unwrap();

    assert_eq!(received.len(), 2);
    assert_eq!(received[0].review.rating, 3);
    assert_eq!(received[1].review.rating, 2);
}

#[tokio::test]
async fn insert_with_unknown_reviewee_is_not_found() {
    let (db, _container) = setup_test_db().await;
    let alice = seed_user(&db, "alice", None).await;

    let err = db
        .review_repo()
        .insert(&NewReview {
            rental_id: Uuid::new_v4(),
            reviewer_id: alice.id,
            reviewee_id: Uuid::new_v4(),
            rating: 3,
            comment: "Who?".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn rating_outside_bounds_is_rejected_by_schema() {
    let (db, _container) = setup_test_db().await;
    let alice = seed_user(&db, "alice", None).await;
    let bob = seed_user(&db, "bob", None).await;

    let err = db
        .review_repo()
        .insert(&NewReview {
            rental_id: Uuid::new_v4(),
            reviewer_id: alice.id,
            reviewee_id: bob.id,
            rating: 9,
            comment: "Bypassing validation".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::DatabaseError(_)));
}

#[tokio::test]
async fn user_round_trips_with_location() {
    let (db, _container) = setup_test_db().await;
    let user = seed_user(&db, "carla", Some(("Turin", 45.07, 7.69))).await;

    let fetched = db
        .user_repo()
        .get(user.id)
        .await
        .unwrap()
        .expect("Should find the user");
    assert_eq!(fetched.username, "carla");
    assert_eq!(fetched.city.as_deref(), Some("Turin"));
    assert_eq!(fetched.latitude, Some(45.07));
    assert_eq!(fetched.role, carshare_core::models::Role::User);

    assert!(db.user_repo().get(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn second_review_of_same_rental_by_same_reviewer_conflicts() {
    let (db, _container) = setup_test_db().await;
    let alice = seed_user(&db, "alice", None).await;
    let bob = seed_user(&db, "bob", None).await;
    let repo = db.review_repo();
    let review = NewReview {
        rental_id: Uuid::new_v4(),
        reviewer_id: alice.id,
        reviewee_id: bob.id,
        rating: 5,
        comment: "Great".into(),
    };

    repo.insert(&review).await.unwrap();
    let err = repo.insert(&review).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    repo.insert(&NewReview {
        reviewer_id: bob.id,
        reviewee_id: alice.id,
        ..review
    })
    .await
    .unwrap();
}
