mod download_worker_test;
mod submission_service_test;
