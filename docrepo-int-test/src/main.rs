use docrepo::doc;
use docrepo::driver::{FetchOptions, SaveOptions, UpdateOptions};
use docrepo::errors::DocRepoResult;
use docrepo_int_test::test_util::{cleanup, create_test_context, USER_TYPE};

fn main() -> DocRepoResult<()> {
    println!("Starting stress test...");
    let ctx = create_test_context()?;

    let count = 100_000;
    let users = ctx.connection().repository("App:User")?;

    let start = std::time::Instant::now();
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        let mut user = doc! {
            first_name: (uuid::Uuid::new_v4().to_string()),
            last_name: (uuid::Uuid::new_v4().to_string()),
            processed: false
        };
        ids.push(users.save(&mut user, &SaveOptions::default())?);
    }
    println!("Inserted {} documents in {:?}", count, start.elapsed());

    let start = std::time::Instant::now();
    for id in &ids {
        let mut patch = doc! { processed: true };
        users.update_by_id(id, &mut patch, &UpdateOptions::default())?;
    }
    println!("Updated {} documents in {:?}", count, start.elapsed());

    let start = std::time::Instant::now();
    let repository = ctx.connection().repository(USER_TYPE)?;
    let mut processed = 0;
    for id in &ids {
        let user = repository.get_by_id(id, &FetchOptions::default())?;
        if user.get("processed").and_then(|v| v.as_bool()) == Some(true) {
            processed += 1;
        }
    }
    println!("Counted {} processed documents in {:?}", processed, start.elapsed());

    cleanup(ctx)
}
